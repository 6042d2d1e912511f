//! Similarity repository trait

use std::sync::Arc;

use async_trait::async_trait;

use super::SimilarityMatrix;
use crate::domain::image::CategoryKey;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Source of per-category similarity matrices
///
/// Returns [`DomainError::SimilarityArtifactMissing`] when the category has
/// no matrix artifact.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SimilarityRepository: Send + Sync {
    async fn load(&self, category: &CategoryKey) -> Result<Arc<SimilarityMatrix>, DomainError>;
}
