use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use qis_core::{ListParams, ListResult};

use crate::model::Score;
use crate::service::scoring::{CreateScoreInput, ScoreFilters, ScoreView, UpdateScoreInput};
use super::{ApiError, AppState, ok_json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/scores", post(create).get(list))
        .route("/scores/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateScoreBody {
    batch_id: String,
    item_id: String,
    score_value: Option<i64>,
    #[serde(default)]
    problem_count: i64,
    comment: Option<String>,
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateScoreBody {
    score_value: Option<i64>,
    #[serde(default)]
    problem_count: i64,
    comment: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreQuery {
    // Inline rather than a flattened ListParams: serde's flatten
    // buffers query values as strings, which breaks usize fields
    // under serde_urlencoded.
    limit: Option<usize>,
    offset: Option<usize>,
    batch_id: Option<String>,
    item_id: Option<String>,
    user_id: Option<String>,
    region_id: Option<String>,
    category_id: Option<String>,
}

async fn create(
    State(svc): State<AppState>,
    Json(body): Json<CreateScoreBody>,
) -> Result<Json<Score>, ApiError> {
    ok_json(svc.create_score(CreateScoreInput {
        batch_id: body.batch_id,
        item_id: body.item_id,
        score_value: body.score_value,
        problem_count: body.problem_count,
        comment: body.comment,
        user_id: body.user_id,
    }))
}

async fn fetch(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScoreView>, ApiError> {
    ok_json(svc.get_score(&id))
}

async fn list(
    State(svc): State<AppState>,
    Query(q): Query<ScoreQuery>,
) -> Result<Json<ListResult<ScoreView>>, ApiError> {
    let filters = ScoreFilters {
        batch_id: q.batch_id,
        item_id: q.item_id,
        user_id: q.user_id,
        region_id: q.region_id,
        category_id: q.category_id,
    };
    let params = ListParams::from_parts(q.limit, q.offset);
    ok_json(svc.list_scores(&params, &filters))
}

async fn update(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateScoreBody>,
) -> Result<Json<Score>, ApiError> {
    ok_json(svc.update_score(
        &id,
        UpdateScoreInput {
            score_value: body.score_value,
            problem_count: body.problem_count,
            comment: body.comment,
        },
    ))
}

async fn remove(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    svc.delete_score(&id).map_err(ApiError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parses_explicit_pagination() {
        let uri: axum::http::Uri = "/scores?limit=10&offset=20&batchId=b1".parse().unwrap();
        let q = Query::<ScoreQuery>::try_from_uri(&uri).unwrap().0;
        assert_eq!(q.limit, Some(10));
        assert_eq!(q.offset, Some(20));
        assert_eq!(q.batch_id.as_deref(), Some("b1"));

        let params = qis_core::ListParams::from_parts(q.limit, q.offset);
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset, 20);
    }

    #[test]
    fn query_defaults_when_pagination_is_absent() {
        let uri: axum::http::Uri = "/scores?userId=u1".parse().unwrap();
        let q = Query::<ScoreQuery>::try_from_uri(&uri).unwrap().0;
        assert_eq!(q.limit, None);
        assert_eq!(q.user_id.as_deref(), Some("u1"));

        let params = qis_core::ListParams::from_parts(q.limit, q.offset);
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 0);
    }
}
