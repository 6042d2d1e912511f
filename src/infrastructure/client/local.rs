//! In-process decision client

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    CategoryKey, Decision, DecisionClient, DecisionRequest, DecisionService, DomainError,
    ImageCatalog, ImageIdentity,
};

/// Calls the decision service directly, skipping the network
///
/// Used for offline simulation runs; byte accounting is the same as over
/// HTTP since the payload size is measured after decoding.
#[derive(Clone)]
pub struct LocalDecisionClient {
    service: Arc<dyn DecisionService>,
    catalog: Arc<dyn ImageCatalog>,
}

impl LocalDecisionClient {
    pub fn new(service: Arc<dyn DecisionService>, catalog: Arc<dyn ImageCatalog>) -> Self {
        Self { service, catalog }
    }
}

impl std::fmt::Debug for LocalDecisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDecisionClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl DecisionClient for LocalDecisionClient {
    async fn category_of(&self, id: &ImageIdentity) -> Result<CategoryKey, DomainError> {
        self.catalog
            .category_of(id)
            .await?
            .ok_or_else(|| DomainError::category_not_found(id.to_string()))
    }

    async fn request_image(&self, request: &DecisionRequest) -> Result<Decision, DomainError> {
        self.service.decide(request).await
    }
}
