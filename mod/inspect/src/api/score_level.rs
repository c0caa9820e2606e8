use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use qis_core::{ListParams, ListResult};

use crate::model::ScoreLevel;
use crate::service::catalog::{CreateScoreLevelInput, UpdateScoreLevelInput};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/score-levels", post(create).get(list))
        .route("/score-levels/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreLevelBody {
    name: String,
    score: i64,
    lower_bound: i64,
    upper_bound: i64,
}

async fn create(
    State(svc): State<AppState>,
    Json(body): Json<ScoreLevelBody>,
) -> Result<Json<ScoreLevel>, ApiError> {
    ok_json(svc.create_score_level(CreateScoreLevelInput {
        name: body.name,
        score: body.score,
        lower_bound: body.lower_bound,
        upper_bound: body.upper_bound,
    }))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScoreLevel>, ApiError> {
    ok_json(svc.get_score_level(&id))
}

async fn list(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<ScoreLevel>>, ApiError> {
    ok_json(svc.list_score_levels(&params))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ScoreLevelBody>,
) -> Result<Json<ScoreLevel>, ApiError> {
    ok_json(svc.update_score_level(
        &id,
        UpdateScoreLevelInput {
            name: body.name,
            score: body.score,
            lower_bound: body.lower_bound,
            upper_bound: body.upper_bound,
        },
    ))
}

async fn remove(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_score_level(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
