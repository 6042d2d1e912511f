//! Application state for shared services

use std::sync::Arc;

use crate::domain::{DecisionService, ImageCatalog};

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub decision_service: Arc<dyn DecisionService>,
    pub catalog: Arc<dyn ImageCatalog>,
}

impl AppState {
    pub fn new(decision_service: Arc<dyn DecisionService>, catalog: Arc<dyn ImageCatalog>) -> Self {
        Self {
            decision_service,
            catalog,
        }
    }
}
