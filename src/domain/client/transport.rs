//! Client transport trait

use async_trait::async_trait;

use crate::domain::decision::{Decision, DecisionRequest};
use crate::domain::image::{CategoryKey, ImageIdentity};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Client view of the decision service, remote or in-process
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DecisionClient: Send + Sync {
    /// Resolves the category of an image, failing with `CategoryNotFound`
    async fn category_of(&self, id: &ImageIdentity) -> Result<CategoryKey, DomainError>;

    /// Asks the service to decide between reuse and fetch
    async fn request_image(&self, request: &DecisionRequest) -> Result<Decision, DomainError>;
}
