use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use qis_core::new_id;
use qis_sql::Value;

use crate::model::{Claims, Session, TokenKind, TokenPair, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Issue a JWT token pair (access + refresh) for a user.
    ///
    /// Creates a session record and returns signed tokens.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let access_exp = now + chrono::Duration::seconds(self.config.access_token_ttl);
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_token_ttl);

        let access_claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            typ: TokenKind::Access,
        };

        let refresh_claims = Claims {
            exp: refresh_exp.timestamp(),
            typ: TokenKind::Refresh,
            ..access_claims.clone()
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            issued_at: now.to_rfc3339(),
            expires_at: refresh_exp.to_rfc3339(),
            revoked: false,
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::Integer(0)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Verify and decode a JWT access token.
    /// Returns the claims if valid and the session is not revoked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {}", e)))?;

        let claims = token_data.claims;

        if let Ok(session) = self.get_record::<Session>("sessions", &claims.sid) {
            if session.revoked {
                return Err(AuthError::Unauthorized("session has been revoked".into()));
            }
        }

        Ok(claims)
    }

    /// Refresh an access token using a refresh token.
    /// Validates the refresh token, revokes the old session, and issues a new pair.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.verify_token(refresh_token)?;

        if claims.typ != TokenKind::Refresh {
            return Err(AuthError::Unauthorized("not a refresh token".into()));
        }

        let user: User = self
            .get_record("users", &claims.sub)
            .map_err(|_| AuthError::Unauthorized("user not found".into()))?;

        if !user.active {
            return Err(AuthError::Unauthorized("user is deactivated".into()));
        }

        self.revoke_session(&claims.sid)?;
        self.issue_tokens(&user)
    }

    /// Revoke a session (token becomes invalid).
    pub fn revoke_session(&self, session_id: &str) -> Result<(), AuthError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;

        self.update_record(
            "sessions",
            session_id,
            &session,
            &[("revoked", Value::Integer(1))],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use qis_sql::SqliteStore;

    use crate::model::{CreateUser, Role};
    use crate::service::{AuthConfig, AuthService};

    fn service() -> Arc<AuthService> {
        let store = SqliteStore::open_in_memory().unwrap();
        AuthService::new(Arc::new(store), AuthConfig::default()).unwrap()
    }

    fn make_user(svc: &AuthService) -> crate::model::User {
        svc.create_user(CreateUser {
            name: "alice".into(),
            password: "s3cret123".into(),
            role: Role::Inspector,
            email: None,
            telephone: None,
        })
        .unwrap()
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let svc = service();
        let user = make_user(&svc);

        let pair = svc.issue_tokens(&user).unwrap();
        let claims = svc.verify_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Inspector);
    }

    #[test]
    fn revoked_session_fails_verification() {
        let svc = service();
        let user = make_user(&svc);

        let pair = svc.issue_tokens(&user).unwrap();
        let claims = svc.verify_token(&pair.access_token).unwrap();

        svc.revoke_session(&claims.sid).unwrap();
        assert!(svc.verify_token(&pair.access_token).is_err());
    }

    #[test]
    fn refresh_rotates_the_session() {
        let svc = service();
        let user = make_user(&svc);

        let pair = svc.issue_tokens(&user).unwrap();
        let new_pair = svc.refresh_tokens(&pair.refresh_token).unwrap();

        // The old access token's session was revoked.
        assert!(svc.verify_token(&pair.access_token).is_err());
        assert!(svc.verify_token(&new_pair.access_token).is_ok());
    }

    #[test]
    fn access_token_cannot_refresh() {
        let svc = service();
        let user = make_user(&svc);

        let pair = svc.issue_tokens(&user).unwrap();
        assert!(svc.refresh_tokens(&pair.access_token).is_err());
        // The failed attempt must not have burned the session.
        assert!(svc.refresh_tokens(&pair.refresh_token).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let svc = service();
        make_user(&svc);

        assert!(svc.verify_login("alice", "wrong").is_err());
        assert!(svc.verify_login("alice", "s3cret123").is_ok());
        assert!(svc.verify_login("nobody", "s3cret123").is_err());
    }
}
