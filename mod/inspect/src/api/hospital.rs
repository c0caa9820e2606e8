use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use qis_core::{ListParams, ListResult};

use crate::model::Hospital;
use crate::service::catalog::{CreateHospitalInput, UpdateHospitalInput};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hospitals", post(create).get(list))
        .route("/hospitals/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HospitalBody {
    name: String,
    address: Option<String>,
}

async fn create(
    State(svc): State<AppState>,
    Json(body): Json<HospitalBody>,
) -> Result<Json<Hospital>, ApiError> {
    ok_json(svc.create_hospital(CreateHospitalInput {
        name: body.name,
        address: body.address,
    }))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Hospital>, ApiError> {
    ok_json(svc.get_hospital(&id))
}

async fn list(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Hospital>>, ApiError> {
    ok_json(svc.list_hospitals(&params))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<HospitalBody>,
) -> Result<Json<Hospital>, ApiError> {
    ok_json(svc.update_hospital(
        &id,
        UpdateHospitalInput {
            name: body.name,
            address: body.address,
        },
    ))
}

async fn remove(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_hospital(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
