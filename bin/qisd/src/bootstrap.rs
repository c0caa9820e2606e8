//! Bootstrap — first-start checks and admin account creation.
//!
//! When qisd starts:
//! 1. Verify the config carries an admin password hash and a JWT secret.
//! 2. Ensure the `admin` user exists in the database.

use std::sync::Arc;

use tracing::info;

use auth::model::Role;
use auth::service::AuthService;

use crate::config::ServerConfig;

/// Login name of the bootstrap superadmin.
pub const ADMIN_USERNAME: &str = "admin";

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.admin.password_hash.is_empty() {
        anyhow::bail!(
            "No admin password hash found in configuration.\n\
             Generate one with an argon2id tool and set [admin] password_hash."
        );
    }
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Ensure the admin user exists. Creates it from the configured password
/// hash if missing.
pub fn ensure_admin_user(
    auth_svc: &Arc<AuthService>,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    match auth_svc.find_user_by_name(ADMIN_USERNAME) {
        Ok(Some(_)) => {
            info!("admin user already exists");
            Ok(())
        }
        Ok(None) => {
            auth_svc
                .create_user_with_hash(
                    ADMIN_USERNAME,
                    &config.admin.password_hash,
                    Role::Administrator,
                )
                .map_err(|e| anyhow::anyhow!("failed to create admin user: {}", e))?;
            info!("Created admin user");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("failed to look up admin user: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminConfig, JwtConfig, StorageConfig};

    #[test]
    fn verify_config_rejects_empty_hash() {
        let config = ServerConfig {
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            jwt: JwtConfig {
                secret: "test".to_string(),
                expire_secs: 3600,
            },
            admin: AdminConfig {
                password_hash: String::new(),
            },
        };
        assert!(verify_config(&config).is_err());
    }
}
