use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use qis_core::ServiceError;

use crate::api::AppState;
use crate::model::{RefreshRequest, TokenPair};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// POST /auth/login — password login, returns a token pair.
async fn login(
    State(svc): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let user = svc
        .verify_login(&body.username, &body.password)
        .map_err(ServiceError::from)?;
    let pair = svc.issue_tokens(&user).map_err(ServiceError::from)?;
    Ok(Json(pair))
}

/// POST /auth/token/refresh — exchange a refresh token for a new pair.
async fn refresh(
    State(svc): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    let pair = svc
        .refresh_tokens(&body.refresh_token)
        .map_err(ServiceError::from)?;
    Ok(Json(pair))
}

/// POST /auth/logout — revoke the current session.
async fn logout(
    State(svc): State<AppState>,
    axum::extract::Extension(claims): axum::extract::Extension<crate::model::Claims>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.revoke_session(&claims.sid).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
