//! Auth module — password login, JWT sessions, and user management.
//!
//! # Resources
//!
//! - **User** — identity with an argon2id password hash and a role
//! - **Session** — JWT issuance record, used for refresh and revocation
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, AuthConfig::default())?;
//! let router = module.routes(); // Mounted under /auth
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use qis_core::Module;

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    pub fn new(
        sql: Arc<dyn qis_sql::SQLStore>,
        config: AuthConfig,
    ) -> Result<Self, qis_core::ServiceError> {
        let service = AuthService::new(sql, config).map_err(qis_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
