//! In-memory image catalog

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;

use super::CategoryIndex;
use crate::domain::image::{CategoryKey, ImageCatalog, ImageIdentity};
use crate::domain::DomainError;

/// Catalog held entirely in memory
///
/// Images may be registered without bytes to model a mapping entry whose
/// file is missing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    index: CategoryIndex,
    images: HashMap<ImageIdentity, Bytes>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(
        mut self,
        id: ImageIdentity,
        category: CategoryKey,
        data: impl Into<Bytes>,
    ) -> Self {
        self.index.insert(id.clone(), category);
        self.images.insert(id, data.into());
        self
    }

    /// Maps an image to a category without any bytes behind it
    pub fn with_mapping_only(mut self, id: ImageIdentity, category: CategoryKey) -> Self {
        self.images.remove(&id);
        self.index.insert(id, category);
        self
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[async_trait]
impl ImageCatalog for InMemoryCatalog {
    async fn category_of(&self, id: &ImageIdentity) -> Result<Option<CategoryKey>, DomainError> {
        Ok(self.index.category_of(id).cloned())
    }

    async fn load_image(
        &self,
        category: &CategoryKey,
        id: &ImageIdentity,
    ) -> Result<Option<Bytes>, DomainError> {
        if self.index.category_of(id) != Some(category) {
            return Ok(None);
        }
        Ok(self.images.get(id).cloned())
    }

    async fn categories(&self) -> Result<Vec<CategoryKey>, DomainError> {
        Ok(self.index.categories())
    }

    async fn images_in(&self, category: &CategoryKey) -> Result<Vec<ImageIdentity>, DomainError> {
        Ok(self.index.images_in(category))
    }
}
