use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use qis_core::{ListParams, ListResult};

use crate::model::Region;
use crate::service::catalog::{CreateRegionInput, UpdateRegionInput};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/regions", post(create).get(list))
        .route("/regions/{id}", get(fetch).put(update).delete(remove))
        .route("/regions/{id}/items", axum::routing::delete(remove_items))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionBody {
    name: String,
    description: Option<String>,
    category_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionQuery {
    limit: Option<usize>,
    offset: Option<usize>,
    category_id: Option<String>,
}

async fn create(
    State(svc): State<AppState>,
    Json(body): Json<RegionBody>,
) -> Result<Json<Region>, ApiError> {
    ok_json(svc.create_region(CreateRegionInput {
        name: body.name,
        description: body.description,
        category_id: body.category_id,
    }))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Region>, ApiError> {
    ok_json(svc.get_region(&id))
}

async fn list(
    State(svc): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Result<Json<ListResult<Region>>, ApiError> {
    let params = ListParams::from_parts(q.limit, q.offset);
    ok_json(svc.list_regions(&params, q.category_id.as_deref()))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RegionBody>,
) -> Result<Json<Region>, ApiError> {
    ok_json(svc.update_region(
        &id,
        UpdateRegionInput {
            name: body.name,
            description: body.description,
            category_id: body.category_id,
        },
    ))
}

async fn remove(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_region(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

/// Bulk soft-delete of every item under a region.
async fn remove_items(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = svc.delete_items_by_region(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true, "deleted": count})))
}
