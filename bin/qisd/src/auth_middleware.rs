//! JWT authentication middleware + role gating.
//!
//! Extracts the JWT from `Authorization: Bearer <token>`, validates it,
//! checks the claimed role against the route's role table, and provides
//! `Claims` to downstream handlers.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, Validation};

use auth::model::{Claims, Role, TokenKind};

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

/// Error type for authentication / authorization failures.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    PermissionDenied(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing authorization token".to_string(),
            ),
            AuthError::InvalidToken(e) => {
                (StatusCode::UNAUTHORIZED, format!("invalid token: {}", e))
            }
            AuthError::PermissionDenied(e) => {
                (StatusCode::FORBIDDEN, format!("permission denied: {}", e))
            }
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}

/// Middleware that extracts and validates the JWT.
///
/// Public paths pass through. Otherwise the token must be valid and the
/// claimed role must be allowed to write to the requested resource.
pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();

    if is_public_path(&path) || is_public_read(&path, request.method()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let token_data =
        jsonwebtoken::decode::<Claims>(token, &jwt_state.decoding_key, &jwt_state.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    // Refresh tokens only buy a new pair at /auth/token/refresh.
    if token_data.claims.typ != TokenKind::Access {
        return Err(AuthError::InvalidToken(
            "refresh token not accepted here".to_string(),
        ));
    }

    check_route_role(&path, request.method(), &token_data.claims)?;

    request.extensions_mut().insert(token_data.claims);

    Ok(next.run(request).await)
}

/// Check if a request path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    matches!(path, "/health" | "/version")
        || path.starts_with("/auth/login")
        || path.starts_with("/auth/token/refresh")
}

/// Score and item reads are open without a token; inspection results are
/// published to hospital staff who have no accounts.
fn is_public_read(path: &str, method: &Method) -> bool {
    method == Method::GET
        && (path.starts_with("/inspect/v1/scores") || path.starts_with("/inspect/v1/items"))
}

/// Role table: which roles may write to which resources.
///
/// Reads (GET) are open to any authenticated user. Administrators may
/// write everywhere.
const WRITE_ROLES: &[(&str, &[Role])] = &[
    (
        "/inspect/v1/scores",
        &[Role::ProjectManager, Role::Inspector, Role::LeadInspector],
    ),
    ("/inspect/v1/batches", &[Role::Manager, Role::Supervisor]),
];

fn check_route_role(path: &str, method: &Method, claims: &Claims) -> Result<(), AuthError> {
    if method == Method::GET || claims.role == Role::Administrator {
        return Ok(());
    }

    for (prefix, roles) in WRITE_ROLES {
        if path.starts_with(prefix) {
            if roles.contains(&claims.role) {
                return Ok(());
            }
            return Err(AuthError::PermissionDenied(format!(
                "role {} may not write to {}",
                claims.role.as_str(),
                prefix
            )));
        }
    }

    // Everything else (catalog, score levels, user management) is
    // administrator-only for writes, except a user's own session.
    if path.starts_with("/auth/logout") {
        return Ok(());
    }

    Err(AuthError::PermissionDenied(format!(
        "role {} may not write to {}",
        claims.role.as_str(),
        path
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "user001".into(),
            name: "alice".into(),
            role,
            sid: "sess001".into(),
            iat: 0,
            exp: i64::MAX,
            typ: TokenKind::Access,
        }
    }

    #[test]
    fn reads_are_open_to_any_role() {
        let c = claims(Role::Inspector);
        assert!(check_route_role("/inspect/v1/hospitals", &Method::GET, &c).is_ok());
    }

    #[test]
    fn inspectors_write_scores_but_not_batches() {
        let c = claims(Role::Inspector);
        assert!(check_route_role("/inspect/v1/scores", &Method::POST, &c).is_ok());
        assert!(check_route_role("/inspect/v1/batches", &Method::POST, &c).is_err());
    }

    #[test]
    fn supervisors_write_batches_but_not_catalog() {
        let c = claims(Role::Supervisor);
        assert!(check_route_role("/inspect/v1/batches/b1/complete", &Method::POST, &c).is_ok());
        assert!(check_route_role("/inspect/v1/hospitals", &Method::POST, &c).is_err());
    }

    #[test]
    fn administrators_write_everywhere() {
        let c = claims(Role::Administrator);
        assert!(check_route_role("/inspect/v1/hospitals", &Method::POST, &c).is_ok());
        assert!(check_route_role("/auth/users", &Method::POST, &c).is_ok());
    }

    #[test]
    fn score_reads_are_public() {
        assert!(is_public_read("/inspect/v1/scores", &Method::GET));
        assert!(is_public_read("/inspect/v1/items/i1", &Method::GET));
        assert!(!is_public_read("/inspect/v1/scores", &Method::POST));
        assert!(!is_public_read("/inspect/v1/batches", &Method::GET));
    }

    #[test]
    fn anyone_can_log_out() {
        let c = claims(Role::Inspector);
        assert!(check_route_role("/auth/logout", &Method::POST, &c).is_ok());
    }
}
