pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use qis_core::Module;

use service::InspectService;

/// Inspect Module — quality inspection batches, catalog, and scoring.
pub struct InspectModule {
    service: Arc<InspectService>,
}

impl InspectModule {
    pub fn new(service: InspectService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for InspectModule {
    fn name(&self) -> &str {
        "inspect"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
