mod login;
mod me;
mod users;

use std::sync::Arc;

use axum::Router;

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth API router, nested under `/auth`.
///
/// Token verification for protected routes is handled by the server's
/// auth middleware, which inserts `Claims` as a request extension.
pub fn router(svc: Arc<AuthService>) -> Router {
    let api = Router::new()
        .merge(login::routes())
        .merge(me::routes())
        .merge(users::routes());

    Router::new().nest("/auth", api).with_state(svc)
}
