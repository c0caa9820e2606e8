use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use qis_core::{ListParams, ListResult, new_id, now_rfc3339};
use qis_sql::Value;

use crate::model::{CreateUser, UpdateUser, User};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Create a new user with an argon2id password hash.
    pub fn create_user(&self, input: CreateUser) -> Result<User, AuthError> {
        if input.name.is_empty() {
            return Err(AuthError::Validation("user name must not be empty".into()));
        }
        if input.password.len() < 6 {
            return Err(AuthError::Validation(
                "password must be at least 6 characters".into(),
            ));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: input.name,
            password_hash: hash_password(&input.password)?,
            role: input.role,
            email: input.email,
            telephone: input.telephone,
            active: true,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let mut indexes: Vec<(&str, Value)> = vec![
            ("name", Value::Text(user.name.clone())),
            ("role", Value::Text(user.role.as_str().to_string())),
            ("active", Value::Integer(1)),
            ("created_at", Value::Text(now.clone())),
            ("updated_at", Value::Text(now)),
        ];
        if let Some(ref email) = user.email {
            indexes.push(("email", Value::Text(email.clone())));
        }

        self.insert_record("users", &user.id, &user, &indexes)?;
        Ok(user)
    }

    /// Create a user from a pre-computed password hash. Used at bootstrap
    /// where the hash comes from configuration.
    pub fn create_user_with_hash(
        &self,
        name: &str,
        password_hash: &str,
        role: crate::model::Role,
    ) -> Result<User, AuthError> {
        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            role,
            email: None,
            telephone: None,
            active: true,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("name", Value::Text(user.name.clone())),
                ("role", Value::Text(user.role.as_str().to_string())),
                ("active", Value::Integer(1)),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;
        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.get_record("users", id)
    }

    /// Find a user by login name.
    pub fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AuthError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM users WHERE name = ?1",
                &[Value::Text(name.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match rows.first() {
            Some(row) => {
                let data = row
                    .get_str("data")
                    .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
                let user =
                    serde_json::from_str(data).map_err(|e| AuthError::Internal(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// List users with pagination.
    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<User>, AuthError> {
        let (items, total) = self.list_records("users", params.limit, params.offset)?;
        Ok(ListResult { items, total })
    }

    pub fn update_user(&self, id: &str, input: UpdateUser) -> Result<User, AuthError> {
        let mut user: User = self.get_record("users", id)?;
        let now = now_rfc3339();

        user.name = input.name;
        user.role = input.role;
        user.email = input.email;
        user.telephone = input.telephone;
        user.active = input.active;
        if let Some(ref password) = input.password {
            if password.len() < 6 {
                return Err(AuthError::Validation(
                    "password must be at least 6 characters".into(),
                ));
            }
            user.password_hash = hash_password(password)?;
        }
        user.updated_at = now.clone();

        let mut indexes: Vec<(&str, Value)> = vec![
            ("name", Value::Text(user.name.clone())),
            ("role", Value::Text(user.role.as_str().to_string())),
            ("active", Value::Integer(if user.active { 1 } else { 0 })),
            ("updated_at", Value::Text(now)),
        ];
        if let Some(ref email) = user.email {
            indexes.push(("email", Value::Text(email.clone())));
        }

        self.update_record("users", id, &user, &indexes)?;
        Ok(user)
    }

    /// Delete a user and all their sessions.
    pub fn delete_user(&self, id: &str) -> Result<(), AuthError> {
        self.sql
            .exec(
                "DELETE FROM sessions WHERE user_id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        self.delete_record("users", id)
    }

    /// Verify a login attempt. Returns the user on success.
    pub fn verify_login(&self, name: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .find_user_by_name(name)?
            .ok_or_else(|| AuthError::Unauthorized("invalid credentials".into()))?;

        if !user.active {
            return Err(AuthError::Unauthorized("user is deactivated".into()));
        }
        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::Unauthorized("invalid credentials".into()));
        }

        Ok(user)
    }
}

/// Hash a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("password hash failed: {}", e)))
}

/// Verify a password against a stored argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use qis_sql::SqliteStore;

    use crate::model::Role;
    use crate::service::AuthConfig;

    use super::*;

    #[test]
    fn created_user_round_trips_through_storage() {
        let store = SqliteStore::open_in_memory().unwrap();
        let svc = AuthService::new(Arc::new(store), AuthConfig::default()).unwrap();

        let user = svc
            .create_user(CreateUser {
                name: "alice".into(),
                password: "s3cret123".into(),
                role: Role::Inspector,
                email: None,
                telephone: None,
            })
            .unwrap();

        // The hash must survive the stored document, or logins for
        // re-loaded users would fail.
        let loaded = svc.get_user(&user.id).unwrap();
        assert_eq!(loaded.password_hash, user.password_hash);
        assert!(loaded.password_hash.starts_with("$argon2id$"));

        assert!(svc.verify_login("alice", "s3cret123").is_ok());
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("s3cret123").unwrap();
        assert!(verify_password("s3cret123", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
