pub mod batch;
pub mod catalog;
pub mod item;
pub mod schema;
pub mod scoring;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use qis_core::{ListParams, ListResult, ServiceError};
use qis_sql::{SQLStore, Value};

/// Inspection service — holds the SQL store and provides business logic.
pub struct InspectService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl InspectService {
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql })
    }

    // ── Generic CRUD helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(map_exec_err)?;

        Ok(())
    }

    /// Get a non-deleted record by id, deserializing the JSON `data` column.
    pub(crate) fn get_active_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1 AND deleted = 0", table);
        self.fetch_one(&sql, id, table)
    }

    /// Get a record by id regardless of its delete flag.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        self.fetch_one(&sql, id, table)
    }

    fn fetch_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        id: &str,
        table: &str,
    ) -> Result<T, ServiceError> {
        let rows = self
            .sql
            .query(sql, &[Value::Text(id.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self
            .sql
            .exec(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// Soft-delete a record: set the delete flag in both the JSON document
    /// and the indexed column. The lookup ignores the current flag so the
    /// operation is idempotent.
    pub(crate) fn soft_delete_record(&self, table: &str, id: &str) -> Result<(), ServiceError> {
        let mut doc: serde_json::Value = self.get_record(table, id)?;
        doc["deleted"] = serde_json::json!(true);
        doc["updateAt"] = serde_json::json!(qis_core::now_rfc3339());

        let json = serde_json::to_string(&doc)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let sql = format!(
            "UPDATE {} SET data = ?1, deleted = 1, update_at = ?2 WHERE id = ?3",
            table
        );
        self.sql
            .exec(
                &sql,
                &[
                    Value::Text(json),
                    Value::Text(qis_core::now_rfc3339()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(())
    }

    /// List non-deleted records with optional filters, pagination, and
    /// total count.
    pub(crate) fn list_records<T: DeserializeOwned + Serialize>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        params_in: &ListParams,
    ) -> Result<ListResult<T>, ServiceError> {
        let limit = params_in.limit.min(500);

        let mut where_clauses = vec!["deleted = 0".to_string()];
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = format!(" WHERE {}", where_clauses.join(" AND "));

        let count_sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let rows = self
            .sql
            .query(&count_sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let total = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(params_in.offset as i64));

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY create_at DESC LIMIT ?{} OFFSET ?{}",
            table, where_sql, limit_idx, offset_idx,
        );

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let item: T = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok(ListResult { items, total })
    }

    /// Count non-deleted records with optional filters.
    pub(crate) fn count_records(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<i64, ServiceError> {
        let mut where_clauses = vec!["deleted = 0".to_string()];
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let sql = format!(
            "SELECT COUNT(*) as cnt FROM {} WHERE {}",
            table,
            where_clauses.join(" AND ")
        );
        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }

    /// Run several statements as one transaction.
    pub(crate) fn exec_tx(&self, stmts: &[(&str, &[Value])]) -> Result<(), ServiceError> {
        self.sql.exec_batch(stmts).map_err(map_exec_err)?;
        Ok(())
    }
}

fn map_exec_err(e: qis_sql::SQLError) -> ServiceError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint") {
        ServiceError::Conflict(msg)
    } else {
        ServiceError::Storage(msg)
    }
}
