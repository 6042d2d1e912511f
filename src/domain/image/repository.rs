//! Image catalog trait

use async_trait::async_trait;
use bytes::Bytes;

use super::{CategoryKey, ImageIdentity};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Read-only access to the image store and its id-to-category mapping
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageCatalog: Send + Sync {
    /// Resolves the category an image belongs to
    async fn category_of(&self, id: &ImageIdentity) -> Result<Option<CategoryKey>, DomainError>;

    /// Loads the raw bytes of an image
    async fn load_image(
        &self,
        category: &CategoryKey,
        id: &ImageIdentity,
    ) -> Result<Option<Bytes>, DomainError>;

    /// Lists every known category, sorted
    async fn categories(&self) -> Result<Vec<CategoryKey>, DomainError>;

    /// Lists the images of one category, sorted
    async fn images_in(&self, category: &CategoryKey) -> Result<Vec<ImageIdentity>, DomainError>;
}
