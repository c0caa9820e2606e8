use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use qis_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use qis_sql::Value;

use crate::model::{Batch, BatchStatus, Item, Score, ScoreLevel};
use super::InspectService;

/// Why a score value could not be derived for an item.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreComputeError {
    /// A leveled item has no single level whose range covers the problem
    /// count. Zero levels match, or more than one (overlapping ranges).
    #[error("no unique score level matches problem count {count}")]
    LevelMismatch { count: i64 },

    /// A direct score exceeds the item's maximum.
    #[error("score {value} exceeds item maximum {max}")]
    ExceedsMaximum { value: i64, max: i64 },
}

impl From<ScoreComputeError> for ServiceError {
    fn from(e: ScoreComputeError) -> Self {
        ServiceError::Validation(e.to_string())
    }
}

/// Derive the value to record for an item.
///
/// Leveled items (any attached score levels) ignore `score_value`: the
/// problem count selects the one level containing it and that level's
/// fixed score is the result. Direct items take `score_value` as given
/// (default 0), rejecting only values above the item's maximum. Negative
/// values pass; deductions below zero are legal.
pub fn compute_score(
    item: &Item,
    levels: &[ScoreLevel],
    score_value: Option<i64>,
    problem_count: i64,
) -> Result<i64, ScoreComputeError> {
    if !levels.is_empty() {
        let mut matched = levels.iter().filter(|l| l.contains(problem_count));
        match (matched.next(), matched.next()) {
            (Some(level), None) => Ok(level.score),
            _ => Err(ScoreComputeError::LevelMismatch { count: problem_count }),
        }
    } else {
        let value = score_value.unwrap_or(0);
        if value > item.score {
            Err(ScoreComputeError::ExceedsMaximum { value, max: item.score })
        } else {
            Ok(value)
        }
    }
}

pub struct CreateScoreInput {
    pub batch_id: String,
    pub item_id: String,
    pub score_value: Option<i64>,
    pub problem_count: i64,
    pub comment: Option<String>,
    pub user_id: String,
}

pub struct UpdateScoreInput {
    pub score_value: Option<i64>,
    pub problem_count: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Default)]
pub struct ScoreFilters {
    pub batch_id: Option<String>,
    pub item_id: Option<String>,
    pub user_id: Option<String>,
    /// Restrict to scores of items in this region.
    pub region_id: Option<String>,
    /// Restrict to scores of items in this category's regions.
    pub category_id: Option<String>,
}

/// Score joined with the item it grades and where that item sits.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreView {
    #[serde(flatten)]
    pub score: Score,
    pub item_name: String,
    /// The item's maximum score.
    pub item_score: i64,
    pub region_name: String,
    pub category_name: String,
}

impl InspectService {
    /// Record a score for one item in a batch.
    ///
    /// The item must be reachable from the batch's categories, must not
    /// already carry a live score, and the value must be derivable. The
    /// score insert and any batch status advance commit together.
    pub fn create_score(&self, input: CreateScoreInput) -> Result<Score, ServiceError> {
        let batch: Batch = self.get_active_record("batches", &input.batch_id)?;

        if !self.item_in_batch_scope(&input.batch_id, &input.item_id)? {
            return Err(ServiceError::Validation(format!(
                "item {} is not covered by batch {}",
                input.item_id, input.batch_id,
            )));
        }

        let existing = self.count_records(
            "scores",
            &[
                ("batch_id", Value::Text(input.batch_id.clone())),
                ("item_id", Value::Text(input.item_id.clone())),
            ],
        )?;
        if existing > 0 {
            return Err(ServiceError::Conflict(format!(
                "item {} already scored in batch {}",
                input.item_id, input.batch_id,
            )));
        }

        let item: Item = self.get_active_record("items", &input.item_id)?;
        let levels = self.item_levels(&input.item_id)?;
        let value = compute_score(&item, &levels, input.score_value, input.problem_count)?;

        let record = Score {
            id: new_id(),
            batch_id: input.batch_id.clone(),
            item_id: input.item_id.clone(),
            value,
            comment: input.comment,
            date: now_rfc3339(),
            user_id: input.user_id,
            deleted: false,
        };

        // Resolve the post-insert status before committing: the new score
        // counts toward completion.
        let mut scored = self.scored_item_ids(&input.batch_id)?;
        scored.insert(input.item_id.clone());
        let next_status = self.resolve_status(&batch, &scored)?;

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let insert_params = vec![
            Value::Text(record.id.clone()),
            Value::Text(json),
            Value::Text(record.batch_id.clone()),
            Value::Text(record.item_id.clone()),
            Value::Text(record.user_id.clone()),
            Value::Integer(record.value),
            Value::Text(record.date.clone()),
        ];

        let batch_params = if next_status != batch.status {
            Some(self.batch_status_params(&batch, next_status)?)
        } else {
            None
        };

        let mut stmts: Vec<(&str, &[Value])> = vec![(
            "INSERT INTO scores (id, data, batch_id, item_id, user_id, value, deleted, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            &insert_params,
        )];
        if let Some(ref p) = batch_params {
            stmts.push((
                "UPDATE batches SET data = ?1, status = ?2, update_at = ?3 WHERE id = ?4",
                p,
            ));
        }

        self.exec_tx(&stmts)?;

        Ok(record)
    }

    /// Recompute and replace an existing score's value. Scope is not
    /// re-checked; it was established at creation. The completion check
    /// runs again since the reachable item set may have shrunk.
    pub fn update_score(&self, id: &str, input: UpdateScoreInput) -> Result<Score, ServiceError> {
        let mut record: Score = self.get_active_record("scores", id)?;

        let item: Item = self.get_active_record("items", &record.item_id)?;
        let levels = self.item_levels(&record.item_id)?;
        record.value = compute_score(&item, &levels, input.score_value, input.problem_count)?;
        record.comment = input.comment;

        let batch: Batch = self.get_active_record("batches", &record.batch_id)?;
        let scored = self.scored_item_ids(&record.batch_id)?;
        let next_status = self.resolve_status(&batch, &scored)?;

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let update_params = vec![
            Value::Text(json),
            Value::Integer(record.value),
            Value::Text(id.to_string()),
        ];
        let batch_params = if next_status != batch.status {
            Some(self.batch_status_params(&batch, next_status)?)
        } else {
            None
        };

        let mut stmts: Vec<(&str, &[Value])> = vec![(
            "UPDATE scores SET data = ?1, value = ?2 WHERE id = ?3",
            &update_params,
        )];
        if let Some(ref p) = batch_params {
            stmts.push((
                "UPDATE batches SET data = ?1, status = ?2, update_at = ?3 WHERE id = ?4",
                p,
            ));
        }
        self.exec_tx(&stmts)?;

        Ok(record)
    }

    /// Soft-delete a score. The batch status is left as is; completion
    /// state never moves backward.
    pub fn delete_score(&self, id: &str) -> Result<(), ServiceError> {
        self.soft_delete_record("scores", id)
    }

    pub fn get_score(&self, id: &str) -> Result<ScoreView, ServiceError> {
        let score: Score = self.get_active_record("scores", id)?;
        self.score_view(score)
    }

    pub fn list_scores(
        &self,
        params: &ListParams,
        filters: &ScoreFilters,
    ) -> Result<ListResult<ScoreView>, ServiceError> {
        let limit = params.limit.min(500);

        let mut where_clauses = vec!["deleted = 0".to_string()];
        let mut sql_params = Vec::new();
        let mut push = |col: &str, val: Value, clauses: &mut Vec<String>, p: &mut Vec<Value>| {
            clauses.push(format!("{} = ?{}", col, p.len() + 1));
            p.push(val);
        };
        if let Some(ref bid) = filters.batch_id {
            push("batch_id", Value::Text(bid.clone()), &mut where_clauses, &mut sql_params);
        }
        if let Some(ref iid) = filters.item_id {
            push("item_id", Value::Text(iid.clone()), &mut where_clauses, &mut sql_params);
        }
        if let Some(ref uid) = filters.user_id {
            push("user_id", Value::Text(uid.clone()), &mut where_clauses, &mut sql_params);
        }
        if let Some(ref rid) = filters.region_id {
            where_clauses.push(format!(
                "item_id IN (SELECT id FROM items WHERE region_id = ?{})",
                sql_params.len() + 1
            ));
            sql_params.push(Value::Text(rid.clone()));
        }
        if let Some(ref cid) = filters.category_id {
            where_clauses.push(format!(
                "item_id IN (SELECT i.id FROM items i
                 JOIN regions r ON r.id = i.region_id WHERE r.category_id = ?{})",
                sql_params.len() + 1
            ));
            sql_params.push(Value::Text(cid.clone()));
        }
        let where_sql = where_clauses.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) as cnt FROM scores WHERE {}", where_sql);
        let rows = self
            .sql
            .query(&count_sql, &sql_params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        let limit_idx = sql_params.len() + 1;
        let offset_idx = sql_params.len() + 2;
        sql_params.push(Value::Integer(limit as i64));
        sql_params.push(Value::Integer(params.offset as i64));

        let sql = format!(
            "SELECT data FROM scores WHERE {} ORDER BY date DESC LIMIT ?{} OFFSET ?{}",
            where_sql, limit_idx, offset_idx,
        );
        let rows = self
            .sql
            .query(&sql, &sql_params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let score: Score = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(self.score_view(score)?);
        }

        Ok(ListResult { items, total })
    }

    // ── Completion tracking ──

    /// Item ids a batch is expected to cover: all non-deleted items in
    /// non-deleted regions of the batch's categories.
    fn batch_item_ids(&self, batch_id: &str) -> Result<HashSet<String>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT i.id AS id FROM items i
                 JOIN regions r ON r.id = i.region_id
                 JOIN batch_categories bc ON bc.category_id = r.category_id
                 WHERE bc.batch_id = ?1 AND i.deleted = 0 AND r.deleted = 0",
                &[Value::Text(batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.iter().filter_map(|r| r.get_str("id").map(String::from)).collect())
    }

    /// Item ids with a live score in a batch.
    fn scored_item_ids(&self, batch_id: &str) -> Result<HashSet<String>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT DISTINCT item_id FROM scores WHERE batch_id = ?1 AND deleted = 0",
                &[Value::Text(batch_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("item_id").map(String::from))
            .collect())
    }

    fn item_in_batch_scope(&self, batch_id: &str, item_id: &str) -> Result<bool, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT COUNT(*) as cnt FROM items i
                 JOIN regions r ON r.id = i.region_id
                 JOIN batch_categories bc ON bc.category_id = r.category_id
                 WHERE bc.batch_id = ?1 AND i.id = ?2
                   AND i.deleted = 0 AND r.deleted = 0",
                &[Value::Text(batch_id.to_string()), Value::Text(item_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) > 0)
    }

    /// Status the batch should carry given the scored set. Never lowers
    /// the current status.
    fn resolve_status(
        &self,
        batch: &Batch,
        scored: &HashSet<String>,
    ) -> Result<BatchStatus, ServiceError> {
        let expected = self.batch_item_ids(&batch.id)?;
        let derived = if expected.is_subset(scored) {
            BatchStatus::AllScored
        } else if scored.is_empty() {
            BatchStatus::NotStarted
        } else {
            BatchStatus::InProgress
        };
        Ok(batch.status.max(derived))
    }

    fn batch_status_params(
        &self,
        batch: &Batch,
        status: BatchStatus,
    ) -> Result<Vec<Value>, ServiceError> {
        let now = now_rfc3339();
        let mut updated = batch.clone();
        updated.status = status;
        updated.update_at = Some(now.clone());
        let json = serde_json::to_string(&updated)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(vec![
            Value::Text(json),
            Value::Integer(status.as_i64()),
            Value::Text(now),
            Value::Text(batch.id.clone()),
        ])
    }

    fn score_view(&self, score: Score) -> Result<ScoreView, ServiceError> {
        let item: Item = self.get_record("items", &score.item_id)?;
        let region: crate::model::Region = self.get_record("regions", &item.region_id)?;
        let category: crate::model::Category =
            self.get_record("categories", &region.category_id)?;

        Ok(ScoreView {
            score,
            item_name: item.name,
            item_score: item.score,
            region_name: region.name,
            category_name: category.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(max: i64) -> Item {
        Item {
            id: "item001".into(),
            name: "hand hygiene".into(),
            description: None,
            score: max,
            region_id: "region001".into(),
            deleted: false,
            create_at: None,
            update_at: None,
        }
    }

    fn level(id: &str, score: i64, lo: i64, hi: i64) -> ScoreLevel {
        ScoreLevel {
            id: id.into(),
            name: format!("level {}", id),
            score,
            lower_bound: lo,
            upper_bound: hi,
            deleted: false,
            create_at: None,
            update_at: None,
        }
    }

    #[test]
    fn leveled_item_picks_containing_level() {
        let levels = vec![level("a", 10, 0, 3), level("b", 20, 4, 5)];
        assert_eq!(compute_score(&item(100), &levels, None, 2), Ok(10));
        assert_eq!(compute_score(&item(100), &levels, None, 4), Ok(20));
        // Boundaries are inclusive on both sides.
        assert_eq!(compute_score(&item(100), &levels, None, 3), Ok(10));
    }

    #[test]
    fn leveled_item_rejects_uncovered_count() {
        let levels = vec![level("a", 10, 0, 3), level("b", 20, 4, 5)];
        assert_eq!(
            compute_score(&item(100), &levels, None, 6),
            Err(ScoreComputeError::LevelMismatch { count: 6 }),
        );
    }

    #[test]
    fn leveled_item_rejects_overlapping_levels() {
        let levels = vec![level("a", 10, 0, 3), level("b", 20, 3, 5)];
        assert_eq!(
            compute_score(&item(100), &levels, None, 3),
            Err(ScoreComputeError::LevelMismatch { count: 3 }),
        );
    }

    #[test]
    fn leveled_item_ignores_direct_value() {
        let levels = vec![level("a", 10, 0, 3)];
        assert_eq!(compute_score(&item(100), &levels, Some(999), 1), Ok(10));
    }

    #[test]
    fn direct_item_takes_value_up_to_maximum() {
        assert_eq!(compute_score(&item(50), &[], Some(50), 0), Ok(50));
        assert_eq!(compute_score(&item(50), &[], Some(7), 0), Ok(7));
    }

    #[test]
    fn direct_item_rejects_value_over_maximum() {
        assert_eq!(
            compute_score(&item(50), &[], Some(51), 0),
            Err(ScoreComputeError::ExceedsMaximum { value: 51, max: 50 }),
        );
    }

    #[test]
    fn direct_item_defaults_to_zero() {
        assert_eq!(compute_score(&item(50), &[], None, 0), Ok(0));
    }

    #[test]
    fn direct_item_accepts_negative_value() {
        assert_eq!(compute_score(&item(50), &[], Some(-5), 0), Ok(-5));
    }
}
