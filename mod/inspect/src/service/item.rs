use serde::Serialize;

use qis_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use qis_sql::Value;

use crate::model::{Item, ScoreLevel};
use super::InspectService;

pub struct CreateItemInput {
    pub name: String,
    pub description: Option<String>,
    pub score: i64,
    pub region_id: String,
    pub score_level_ids: Vec<String>,
}

pub struct UpdateItemInput {
    pub name: String,
    pub description: Option<String>,
    pub score: i64,
    pub region_id: String,
    pub score_level_ids: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ItemFilters {
    pub region_id: Option<String>,
    /// When set, each item is annotated with its scoring state in this batch.
    pub batch_id: Option<String>,
}

/// Reference to a score level attached to an item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRef {
    pub id: String,
    pub name: String,
}

/// Item plus its level set and, when a batch filter is given, whether it
/// has been scored in that batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,

    pub score_levels: Vec<LevelRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_scored: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_value: Option<i64>,
}

impl InspectService {
    pub fn create_item(&self, input: CreateItemInput) -> Result<Item, ServiceError> {
        let _region = self.get_region(&input.region_id)?;
        self.assert_levels_exist(&input.score_level_ids)?;

        let now = now_rfc3339();
        let record = Item {
            id: new_id(),
            name: input.name,
            description: input.description,
            score: input.score,
            region_id: input.region_id,
            deleted: false,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        // Item row and its level links commit together.
        let insert_params = vec![
            Value::Text(record.id.clone()),
            Value::Text(json),
            Value::Text(record.name.clone()),
            Value::Text(record.region_id.clone()),
            Value::Integer(record.score),
            Value::Text(now.clone()),
            Value::Text(now),
        ];
        let link_params: Vec<Vec<Value>> = input
            .score_level_ids
            .iter()
            .map(|lid| vec![Value::Text(record.id.clone()), Value::Text(lid.clone())])
            .collect();

        let mut stmts: Vec<(&str, &[Value])> = vec![(
            "INSERT INTO items (id, data, name, region_id, score, deleted, create_at, update_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
            &insert_params,
        )];
        for p in &link_params {
            stmts.push((
                "INSERT INTO item_levels (item_id, level_id) VALUES (?1, ?2)",
                p,
            ));
        }
        self.exec_tx(&stmts)?;

        Ok(record)
    }

    pub fn get_item(&self, id: &str) -> Result<ItemView, ServiceError> {
        let item: Item = self.get_active_record("items", id)?;
        self.item_view(item, None)
    }

    pub fn list_items(
        &self,
        params: &ListParams,
        filters: &ItemFilters,
    ) -> Result<ListResult<ItemView>, ServiceError> {
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref rid) = filters.region_id {
            f.push(("region_id", Value::Text(rid.clone())));
        }
        let result: ListResult<Item> = self.list_records("items", &f, params)?;

        let mut items = Vec::new();
        for item in result.items {
            items.push(self.item_view(item, filters.batch_id.as_deref())?);
        }

        Ok(ListResult { items, total: result.total })
    }

    pub fn update_item(&self, id: &str, input: UpdateItemInput) -> Result<Item, ServiceError> {
        let mut record: Item = self.get_active_record("items", id)?;
        let _region = self.get_region(&input.region_id)?;
        self.assert_levels_exist(&input.score_level_ids)?;

        let now = now_rfc3339();
        record.name = input.name;
        record.description = input.description;
        record.score = input.score;
        record.region_id = input.region_id;
        record.update_at = Some(now.clone());

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        // The level set is replaced wholesale.
        let update_params = vec![
            Value::Text(json),
            Value::Text(record.name.clone()),
            Value::Text(record.region_id.clone()),
            Value::Integer(record.score),
            Value::Text(now),
            Value::Text(id.to_string()),
        ];
        let clear_params = vec![Value::Text(id.to_string())];
        let link_params: Vec<Vec<Value>> = input
            .score_level_ids
            .iter()
            .map(|lid| vec![Value::Text(id.to_string()), Value::Text(lid.clone())])
            .collect();

        let mut stmts: Vec<(&str, &[Value])> = vec![
            (
                "UPDATE items SET data = ?1, name = ?2, region_id = ?3, score = ?4, update_at = ?5
                 WHERE id = ?6",
                &update_params,
            ),
            ("DELETE FROM item_levels WHERE item_id = ?1", &clear_params),
        ];
        for p in &link_params {
            stmts.push((
                "INSERT INTO item_levels (item_id, level_id) VALUES (?1, ?2)",
                p,
            ));
        }
        self.exec_tx(&stmts)?;

        Ok(record)
    }

    pub fn delete_item(&self, id: &str) -> Result<(), ServiceError> {
        self.soft_delete_record("items", id)
    }

    /// Soft-delete every non-deleted item in a region. Returns the count.
    pub fn delete_items_by_region(&self, region_id: &str) -> Result<usize, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT id FROM items WHERE region_id = ?1 AND deleted = 0",
                &[Value::Text(region_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if rows.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "no items under region {}",
                region_id
            )));
        }

        let mut count = 0;
        for row in &rows {
            if let Some(id) = row.get_str("id") {
                self.soft_delete_record("items", id)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Non-deleted score levels attached to an item, in bound order.
    pub(crate) fn item_levels(&self, item_id: &str) -> Result<Vec<ScoreLevel>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT sl.data AS data FROM score_levels sl
                 JOIN item_levels il ON il.level_id = sl.id
                 WHERE il.item_id = ?1 AND sl.deleted = 0
                 ORDER BY sl.lower_bound",
                &[Value::Text(item_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut levels = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            levels.push(
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?,
            );
        }
        Ok(levels)
    }

    fn item_view(&self, item: Item, batch_id: Option<&str>) -> Result<ItemView, ServiceError> {
        let score_levels = self
            .item_levels(&item.id)?
            .into_iter()
            .map(|l| LevelRef { id: l.id, name: l.name })
            .collect();

        let (is_scored, score_value) = match batch_id {
            Some(bid) => {
                let rows = self
                    .sql
                    .query(
                        "SELECT value FROM scores
                         WHERE batch_id = ?1 AND item_id = ?2 AND deleted = 0",
                        &[Value::Text(bid.to_string()), Value::Text(item.id.clone())],
                    )
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                match rows.first() {
                    Some(row) => (Some(true), row.get_i64("value")),
                    None => (Some(false), None),
                }
            }
            None => (None, None),
        };

        Ok(ItemView { item, score_levels, is_scored, score_value })
    }

    fn assert_levels_exist(&self, level_ids: &[String]) -> Result<(), ServiceError> {
        for lid in level_ids {
            let _level = self.get_score_level(lid)?;
        }
        Ok(())
    }
}
