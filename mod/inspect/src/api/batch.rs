use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use qis_core::{ListParams, ListResult};

use crate::model::{Batch, BatchStatus};
use crate::service::batch::{
    BatchFilters, BatchView, CompleteBatchInput, CreateBatchInput, UpdateBatchInput,
};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/batches", post(create).get(list))
        .route("/batches/{id}", get(fetch).put(update).delete(remove))
        .route("/batches/{id}/complete", post(complete))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBatchBody {
    name: String,
    hospital_id: String,
    category_ids: Vec<String>,
    start_time: Option<String>,
    note: Option<String>,
    inspector_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBatchBody {
    name: String,
    start_time: String,
    note: Option<String>,
    inspector_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteBatchBody {
    summarize_problem: Option<String>,
    summarize_highlight: Option<String>,
    summarize_need_improve: Option<String>,
    note: Option<String>,
    summarize_person_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchQuery {
    // Inline pagination fields; a flattened ListParams would force
    // every value through serde's string buffer and reject numeric
    // query parameters.
    limit: Option<usize>,
    offset: Option<usize>,
    hospital_id: Option<String>,
    status: Option<BatchStatus>,
}

async fn create(
    State(svc): State<AppState>,
    Json(body): Json<CreateBatchBody>,
) -> Result<Json<Batch>, ApiError> {
    ok_json(svc.create_batch(CreateBatchInput {
        name: body.name,
        hospital_id: body.hospital_id,
        category_ids: body.category_ids,
        start_time: body.start_time,
        note: body.note,
        inspector_id: body.inspector_id,
    }))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BatchView>, ApiError> {
    ok_json(svc.get_batch(&id))
}

async fn list(
    State(svc): State<AppState>,
    Query(q): Query<BatchQuery>,
) -> Result<Json<ListResult<BatchView>>, ApiError> {
    let filters = BatchFilters {
        hospital_id: q.hospital_id,
        status: q.status,
    };
    let params = ListParams::from_parts(q.limit, q.offset);
    ok_json(svc.list_batches(&params, &filters))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBatchBody>,
) -> Result<Json<Batch>, ApiError> {
    ok_json(svc.update_batch(
        &id,
        UpdateBatchInput {
            name: body.name,
            start_time: body.start_time,
            note: body.note,
            inspector_id: body.inspector_id,
        },
    ))
}

async fn remove(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_batch(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

async fn complete(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CompleteBatchBody>,
) -> Result<Json<Batch>, ApiError> {
    ok_json(svc.complete_batch(
        &id,
        CompleteBatchInput {
            summarize_problem: body.summarize_problem,
            summarize_highlight: body.summarize_highlight,
            summarize_need_improve: body.summarize_need_improve,
            note: body.note,
            summarize_person_id: body.summarize_person_id,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parses_numeric_status_and_pagination() {
        let uri: axum::http::Uri = "/batches?status=2&limit=5&hospitalId=h1".parse().unwrap();
        let q = Query::<BatchQuery>::try_from_uri(&uri).unwrap().0;
        assert_eq!(q.status, Some(BatchStatus::AllScored));
        assert_eq!(q.limit, Some(5));
        assert_eq!(q.hospital_id.as_deref(), Some("h1"));
    }

    #[test]
    fn query_rejects_unknown_status() {
        let uri: axum::http::Uri = "/batches?status=9".parse().unwrap();
        assert!(Query::<BatchQuery>::try_from_uri(&uri).is_err());
    }
}
