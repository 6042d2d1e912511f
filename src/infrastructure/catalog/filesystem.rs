//! Catalog backed by the server image tree

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};

use super::CategoryIndex;
use crate::domain::image::{CategoryKey, ImageCatalog, ImageIdentity};
use crate::domain::DomainError;

/// Image bytes at `{image_dir}/{website}/{category}/{id}.jpg`, categories from
/// a static JSON object mapping image id to `"{website} - {category}"`.
#[derive(Debug, Clone)]
pub struct FileSystemCatalog {
    image_dir: PathBuf,
    index: CategoryIndex,
}

impl FileSystemCatalog {
    /// Reads the category mapping once; entries that do not parse are skipped
    pub async fn load(
        image_dir: impl Into<PathBuf>,
        category_map: impl AsRef<Path>,
    ) -> Result<Self, DomainError> {
        let category_map = category_map.as_ref();
        let raw = tokio::fs::read(category_map).await.map_err(|e| {
            DomainError::configuration(format!(
                "Cannot read category map {}: {}",
                category_map.display(),
                e
            ))
        })?;

        let mapping: HashMap<String, String> = serde_json::from_slice(&raw).map_err(|e| {
            DomainError::configuration(format!(
                "Invalid category map {}: {}",
                category_map.display(),
                e
            ))
        })?;

        let mut index = CategoryIndex::default();
        let mut skipped = 0usize;

        for (id, category) in mapping {
            match (ImageIdentity::new(id.as_str()), CategoryKey::parse(&category)) {
                (Ok(id), Ok(category)) => index.insert(id, category),
                (Err(e), _) | (_, Err(e)) => {
                    skipped += 1;
                    warn!(image_id = %id, error = %e, "Skipping category map entry");
                }
            }
        }

        info!(
            images = index.len(),
            categories = index.categories().len(),
            skipped = skipped,
            "Loaded category map"
        );

        Ok(Self {
            image_dir: image_dir.into(),
            index,
        })
    }

    pub fn image_path(&self, category: &CategoryKey, id: &ImageIdentity) -> PathBuf {
        self.image_dir
            .join(category.website())
            .join(category.category())
            .join(format!("{}.jpg", id))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[async_trait]
impl ImageCatalog for FileSystemCatalog {
    async fn category_of(&self, id: &ImageIdentity) -> Result<Option<CategoryKey>, DomainError> {
        Ok(self.index.category_of(id).cloned())
    }

    async fn load_image(
        &self,
        category: &CategoryKey,
        id: &ImageIdentity,
    ) -> Result<Option<Bytes>, DomainError> {
        let path = self.image_path(category, id);

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn categories(&self) -> Result<Vec<CategoryKey>, DomainError> {
        Ok(self.index.categories())
    }

    async fn images_in(&self, category: &CategoryKey) -> Result<Vec<ImageIdentity>, DomainError> {
        Ok(self.index.images_in(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fixture() -> (tempfile::TempDir, FileSystemCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("id_to_category.json");
        std::fs::write(
            &map,
            r#"{"1_1": "shop - hats", "2_1": "shop - hats", "3_1": "other - shoes", "bad": "shop - hats", "4_1": "nocategory"}"#,
        )
        .unwrap();

        let images = dir.path().join("images");
        std::fs::create_dir_all(images.join("shop").join("hats")).unwrap();
        std::fs::write(images.join("shop").join("hats").join("1_1.jpg"), b"jpegbytes").unwrap();

        let catalog = FileSystemCatalog::load(&images, &map).await.unwrap();
        (dir, catalog)
    }

    #[tokio::test]
    async fn test_load_skips_malformed_entries() {
        let (_dir, catalog) = fixture().await;

        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.categories().await.unwrap(),
            vec![CategoryKey::new("other", "shoes"), CategoryKey::new("shop", "hats")]
        );
    }

    #[tokio::test]
    async fn test_category_lookup() {
        let (_dir, catalog) = fixture().await;

        let category = catalog
            .category_of(&ImageIdentity::from_parts(2, 1))
            .await
            .unwrap();
        assert_eq!(category, Some(CategoryKey::new("shop", "hats")));

        let unknown = catalog
            .category_of(&ImageIdentity::from_parts(99, 1))
            .await
            .unwrap();
        assert_eq!(unknown, None);
    }

    #[tokio::test]
    async fn test_load_image_present_and_missing() {
        let (_dir, catalog) = fixture().await;
        let hats = CategoryKey::new("shop", "hats");

        let data = catalog
            .load_image(&hats, &ImageIdentity::from_parts(1, 1))
            .await
            .unwrap();
        assert_eq!(data.as_deref(), Some(&b"jpegbytes"[..]));

        let missing = catalog
            .load_image(&hats, &ImageIdentity::from_parts(2, 1))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_missing_map_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSystemCatalog::load(dir.path(), dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
