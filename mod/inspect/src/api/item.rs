use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use qis_core::{ListParams, ListResult};

use crate::model::Item;
use crate::service::item::{CreateItemInput, ItemFilters, ItemView, UpdateItemInput};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", post(create).get(list))
        .route("/items/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemBody {
    name: String,
    description: Option<String>,
    score: i64,
    region_id: String,
    #[serde(default)]
    score_level_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemQuery {
    limit: Option<usize>,
    offset: Option<usize>,
    region_id: Option<String>,
    batch_id: Option<String>,
}

async fn create(
    State(svc): State<AppState>,
    Json(body): Json<ItemBody>,
) -> Result<Json<Item>, ApiError> {
    ok_json(svc.create_item(CreateItemInput {
        name: body.name,
        description: body.description,
        score: body.score,
        region_id: body.region_id,
        score_level_ids: body.score_level_ids,
    }))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemView>, ApiError> {
    ok_json(svc.get_item(&id))
}

async fn list(
    State(svc): State<AppState>,
    Query(q): Query<ItemQuery>,
) -> Result<Json<ListResult<ItemView>>, ApiError> {
    let filters = ItemFilters {
        region_id: q.region_id,
        batch_id: q.batch_id,
    };
    let params = ListParams::from_parts(q.limit, q.offset);
    ok_json(svc.list_items(&params, &filters))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ItemBody>,
) -> Result<Json<Item>, ApiError> {
    ok_json(svc.update_item(
        &id,
        UpdateItemInput {
            name: body.name,
            description: body.description,
            score: body.score,
            region_id: body.region_id,
            score_level_ids: body.score_level_ids,
        },
    ))
}

async fn remove(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_item(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
