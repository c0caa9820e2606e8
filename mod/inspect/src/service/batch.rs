use serde::Serialize;

use qis_core::{ListParams, ListResult, ServiceError, new_id, now_rfc3339};
use qis_sql::Value;

use crate::model::{Batch, BatchStatus, Category, Hospital};
use super::InspectService;

pub struct CreateBatchInput {
    pub name: String,
    pub hospital_id: String,
    pub category_ids: Vec<String>,
    pub start_time: Option<String>,
    pub note: Option<String>,
    pub inspector_id: Option<String>,
}

pub struct UpdateBatchInput {
    pub name: String,
    pub start_time: String,
    pub note: Option<String>,
    pub inspector_id: Option<String>,
}

pub struct CompleteBatchInput {
    pub summarize_problem: Option<String>,
    pub summarize_highlight: Option<String>,
    pub summarize_need_improve: Option<String>,
    pub note: Option<String>,
    pub summarize_person_id: String,
}

#[derive(Debug, Default)]
pub struct BatchFilters {
    pub hospital_id: Option<String>,
    pub status: Option<BatchStatus>,
}

/// Batch with resolved hospital and category names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchView {
    #[serde(flatten)]
    pub batch: Batch,
    pub hospital_name: String,
    pub category_names: Vec<String>,
}

impl InspectService {
    pub fn create_batch(&self, input: CreateBatchInput) -> Result<Batch, ServiceError> {
        if input.category_ids.is_empty() {
            return Err(ServiceError::Validation(
                "batch requires at least one category".into(),
            ));
        }
        let _hospital: Hospital = self.get_active_record("hospitals", &input.hospital_id)?;
        for cid in &input.category_ids {
            let _category: Category = self.get_active_record("categories", cid)?;
        }

        let now = now_rfc3339();
        let record = Batch {
            id: new_id(),
            name: input.name,
            hospital_id: input.hospital_id,
            category_ids: input.category_ids,
            start_time: input.start_time.unwrap_or_else(now_rfc3339),
            end_time: None,
            // New batches always begin unscored.
            status: BatchStatus::NotStarted,
            summarize_problem: None,
            summarize_highlight: None,
            summarize_need_improve: None,
            note: input.note,
            inspector_id: input.inspector_id,
            summarize_person_id: None,
            deleted: false,
            create_at: Some(now.clone()),
            update_at: Some(now.clone()),
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let insert_params = vec![
            Value::Text(record.id.clone()),
            Value::Text(json),
            Value::Text(record.name.clone()),
            Value::Text(record.hospital_id.clone()),
            Value::Integer(record.status.as_i64()),
            Value::Text(now.clone()),
            Value::Text(now),
        ];
        let link_params: Vec<Vec<Value>> = record
            .category_ids
            .iter()
            .map(|cid| vec![Value::Text(record.id.clone()), Value::Text(cid.clone())])
            .collect();

        let mut stmts: Vec<(&str, &[Value])> = vec![(
            "INSERT INTO batches (id, data, name, hospital_id, status, deleted, create_at, update_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
            &insert_params,
        )];
        for p in &link_params {
            stmts.push((
                "INSERT INTO batch_categories (batch_id, category_id) VALUES (?1, ?2)",
                p,
            ));
        }
        self.exec_tx(&stmts)?;

        Ok(record)
    }

    pub fn get_batch(&self, id: &str) -> Result<BatchView, ServiceError> {
        let batch: Batch = self.get_active_record("batches", id)?;
        self.batch_view(batch)
    }

    pub fn list_batches(
        &self,
        params: &ListParams,
        filters: &BatchFilters,
    ) -> Result<ListResult<BatchView>, ServiceError> {
        let mut f: Vec<(&str, Value)> = Vec::new();
        if let Some(ref hid) = filters.hospital_id {
            f.push(("hospital_id", Value::Text(hid.clone())));
        }
        if let Some(status) = filters.status {
            f.push(("status", Value::Integer(status.as_i64())));
        }
        let result: ListResult<Batch> = self.list_records("batches", &f, params)?;

        let mut items = Vec::new();
        for batch in result.items {
            items.push(self.batch_view(batch)?);
        }

        Ok(ListResult { items, total: result.total })
    }

    /// Update batch metadata. Status, categories, and summary fields are
    /// managed by scoring and completion, not here.
    pub fn update_batch(&self, id: &str, input: UpdateBatchInput) -> Result<Batch, ServiceError> {
        let mut record: Batch = self.get_active_record("batches", id)?;

        record.name = input.name;
        record.start_time = input.start_time;
        record.note = input.note;
        record.inspector_id = input.inspector_id;
        record.update_at = Some(now_rfc3339());

        self.update_record(
            "batches",
            id,
            &record,
            &[
                ("name", Value::Text(record.name.clone())),
                ("update_at", Value::Text(now_rfc3339())),
            ],
        )?;

        Ok(record)
    }

    pub fn delete_batch(&self, id: &str) -> Result<(), ServiceError> {
        self.soft_delete_record("batches", id)
    }

    /// Close out a fully scored batch: record the summary, stamp the end
    /// time, and advance it to `Summarized`. Only a batch in `AllScored`
    /// can be completed.
    pub fn complete_batch(
        &self,
        id: &str,
        input: CompleteBatchInput,
    ) -> Result<Batch, ServiceError> {
        let mut record: Batch = self.get_active_record("batches", id)?;

        if record.status != BatchStatus::AllScored {
            return Err(ServiceError::InvalidState(format!(
                "batch {} has status {}, expected {}",
                id,
                record.status.as_i64(),
                BatchStatus::AllScored.as_i64(),
            )));
        }

        let now = now_rfc3339();
        record.summarize_problem = input.summarize_problem;
        record.summarize_highlight = input.summarize_highlight;
        record.summarize_need_improve = input.summarize_need_improve;
        if input.note.is_some() {
            record.note = input.note;
        }
        record.summarize_person_id = Some(input.summarize_person_id);
        record.end_time = Some(now.clone());
        record.status = BatchStatus::Summarized;
        record.update_at = Some(now.clone());

        self.update_record(
            "batches",
            id,
            &record,
            &[
                ("status", Value::Integer(record.status.as_i64())),
                ("update_at", Value::Text(now)),
            ],
        )?;

        Ok(record)
    }

    fn batch_view(&self, batch: Batch) -> Result<BatchView, ServiceError> {
        let hospital: Hospital = self.get_record("hospitals", &batch.hospital_id)?;

        let mut category_names = Vec::new();
        for cid in &batch.category_ids {
            let category: Category = self.get_record("categories", cid)?;
            category_names.push(category.name);
        }

        Ok(BatchView {
            batch,
            hospital_name: hospital.name,
            category_names,
        })
    }
}
