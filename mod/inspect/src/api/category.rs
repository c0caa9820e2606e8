use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use qis_core::{ListParams, ListResult};

use crate::model::Category;
use crate::service::catalog::{CreateCategoryInput, UpdateCategoryInput};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create).get(list))
        .route("/categories/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryBody {
    name: String,
    description: Option<String>,
}

async fn create(
    State(svc): State<AppState>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Category>, ApiError> {
    ok_json(svc.create_category(CreateCategoryInput {
        name: body.name,
        description: body.description,
    }))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    ok_json(svc.get_category(&id))
}

async fn list(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Category>>, ApiError> {
    ok_json(svc.list_categories(&params))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Category>, ApiError> {
    ok_json(svc.update_category(
        &id,
        UpdateCategoryInput {
            name: body.name,
            description: body.description,
        },
    ))
}

async fn remove(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_category(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
