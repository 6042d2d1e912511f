//! Cache decision service - reuse a cached look-alike or serve the real image

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{
    select_reuse_candidate, Decision, DecisionRequest, DecisionService, DomainError,
    ImageCatalog, ImagePayload, SimilarityRepository,
};

/// Server-side decision service
///
/// Holds no per-call state; the similarity repository and the catalog are
/// read-only, so one instance serves concurrent requests.
pub struct CacheDecisionService {
    similarity: Arc<dyn SimilarityRepository>,
    catalog: Arc<dyn ImageCatalog>,
}

impl CacheDecisionService {
    pub fn new(similarity: Arc<dyn SimilarityRepository>, catalog: Arc<dyn ImageCatalog>) -> Self {
        Self {
            similarity,
            catalog,
        }
    }

    /// Looks for a cached substitute; `None` when similarity cannot help
    async fn find_reuse(&self, request: &DecisionRequest) -> Result<Option<Decision>, DomainError> {
        if request.cached.is_empty() {
            return Ok(None);
        }

        let matrix = match self.similarity.load(&request.category).await {
            Ok(matrix) => matrix,
            Err(DomainError::SimilarityArtifactMissing { category }) => {
                warn!(
                    category = %category,
                    image_id = %request.requested,
                    "No similarity matrix, falling back to fetch"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let candidate =
            select_reuse_candidate(&matrix, &request.requested, request.threshold, &request.cached);

        Ok(candidate.map(|c| {
            debug!(
                image_id = %request.requested,
                reuse = %c.id,
                score = c.score,
                threshold = request.threshold,
                "Reusing cached image"
            );
            Decision::Reuse { existing: c.id }
        }))
    }

    /// Serves the requested bytes; the catalog must map the id to the request category
    async fn fetch(&self, request: &DecisionRequest) -> Result<Decision, DomainError> {
        let not_found = || {
            DomainError::image_not_found(request.requested.to_string(), request.category.to_string())
        };

        let mapped = self.catalog.category_of(&request.requested).await?;
        if mapped.as_ref() != Some(&request.category) {
            warn!(
                image_id = %request.requested,
                category = %request.category,
                mapped = ?mapped,
                "Requested image is not in the requested category"
            );
            return Err(not_found());
        }

        let data = self
            .catalog
            .load_image(&request.category, &request.requested)
            .await?
            .ok_or_else(not_found)?;

        debug!(
            image_id = %request.requested,
            bytes = data.len(),
            "Serving image payload"
        );

        Ok(Decision::Fetch(ImagePayload::new(
            request.requested.clone(),
            request.category.clone(),
            data,
        )))
    }
}

impl std::fmt::Debug for CacheDecisionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheDecisionService").finish_non_exhaustive()
    }
}

#[async_trait]
impl DecisionService for CacheDecisionService {
    async fn decide(&self, request: &DecisionRequest) -> Result<Decision, DomainError> {
        match self.find_reuse(request).await? {
            Some(reuse) => Ok(reuse),
            None => self.fetch(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::MockImageCatalog;
    use crate::domain::similarity::MockSimilarityRepository;
    use crate::domain::{CategoryKey, ImageIdentity, SimilarityMatrix};
    use crate::infrastructure::catalog::{FileSystemCatalog, InMemoryCatalog};
    use crate::infrastructure::similarity::{parse_matrix, InMemorySimilarityRepository};

    fn id(s: &str) -> ImageIdentity {
        ImageIdentity::new(s).unwrap()
    }

    fn shoes() -> CategoryKey {
        CategoryKey::new("shop", "shoes")
    }

    fn service() -> CacheDecisionService {
        let matrix = SimilarityMatrix::builder(shoes())
            .with_score(id("1_1"), id("1_2"), 1)
            .unwrap()
            .with_score(id("1_1"), id("2_1"), 3)
            .unwrap()
            .with_score(id("1_2"), id("2_1"), 2)
            .unwrap()
            .build();

        let catalog = InMemoryCatalog::new()
            .with_image(id("1_1"), shoes(), vec![1u8; 100])
            .with_image(id("1_2"), shoes(), vec![2u8; 200])
            .with_image(id("2_1"), shoes(), vec![3u8; 300])
            .with_mapping_only(id("3_1"), shoes());

        CacheDecisionService::new(
            Arc::new(InMemorySimilarityRepository::new().with_matrix(matrix)),
            Arc::new(catalog),
        )
    }

    #[tokio::test]
    async fn test_reuse_when_score_meets_threshold() {
        let request = DecisionRequest::new(id("2_1"), shoes())
            .with_threshold(3)
            .with_cached([id("1_1")]);

        let decision = service().decide(&request).await.unwrap();
        assert_eq!(decision, Decision::Reuse { existing: id("1_1") });
    }

    #[tokio::test]
    async fn test_fetch_when_threshold_too_high() {
        let request = DecisionRequest::new(id("2_1"), shoes())
            .with_threshold(4)
            .with_cached([id("1_1")]);

        match service().decide(&request).await.unwrap() {
            Decision::Fetch(payload) => {
                assert_eq!(payload.id, id("2_1"));
                assert_eq!(payload.category, shoes());
                assert_eq!(payload.byte_size(), 300);
            }
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_cache_always_fetches() {
        let request = DecisionRequest::new(id("2_1"), shoes()).with_threshold(0);
        let decision = service().decide(&request).await.unwrap();
        assert!(!decision.is_reuse());
    }

    #[tokio::test]
    async fn test_empty_cache_skips_similarity_lookup() {
        let mut similarity = MockSimilarityRepository::new();
        similarity.expect_load().times(0);

        let catalog = InMemoryCatalog::new().with_image(id("2_1"), shoes(), vec![0u8; 10]);
        let service = CacheDecisionService::new(Arc::new(similarity), Arc::new(catalog));

        let decision = service
            .decide(&DecisionRequest::new(id("2_1"), shoes()))
            .await
            .unwrap();
        assert!(!decision.is_reuse());
    }

    #[tokio::test]
    async fn test_same_article_never_reused() {
        let request = DecisionRequest::new(id("1_2"), shoes())
            .with_threshold(0)
            .with_cached([id("1_1")]);

        let decision = service().decide(&request).await.unwrap();
        assert!(!decision.is_reuse());
    }

    #[tokio::test]
    async fn test_decision_is_idempotent() {
        let service = service();
        let request = DecisionRequest::new(id("2_1"), shoes())
            .with_threshold(2)
            .with_cached([id("1_1"), id("1_2")]);

        let first = service.decide(&request).await.unwrap();
        let second = service.decide(&request).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Decision::Reuse { existing: id("1_1") });
    }

    #[tokio::test]
    async fn test_missing_image_is_not_found() {
        let request = DecisionRequest::new(id("3_1"), shoes()).with_cached([id("1_1")]);

        let result = service().decide(&request).await;
        assert!(matches!(result, Err(DomainError::ImageNotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_matrix_falls_back_to_fetch() {
        let hats = CategoryKey::new("shop", "hats");
        let catalog = InMemoryCatalog::new()
            .with_image(id("5_1"), hats.clone(), vec![0u8; 50])
            .with_image(id("6_1"), hats.clone(), vec![0u8; 60]);
        let service = CacheDecisionService::new(
            Arc::new(InMemorySimilarityRepository::new()),
            Arc::new(catalog),
        );

        let request = DecisionRequest::new(id("6_1"), hats).with_cached([id("5_1")]);
        match service.decide(&request).await.unwrap() {
            Decision::Fetch(payload) => assert_eq!(payload.byte_size(), 60),
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_similarity_errors_propagate() {
        let mut similarity = MockSimilarityRepository::new();
        similarity
            .expect_load()
            .returning(|_| Err(DomainError::validation("corrupt matrix")));
        let mut catalog = MockImageCatalog::new();
        catalog.expect_load_image().times(0);

        let service = CacheDecisionService::new(Arc::new(similarity), Arc::new(catalog));
        let request = DecisionRequest::new(id("2_1"), shoes()).with_cached([id("1_1")]);

        let result = service.decide(&request).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_empty_csv_cell_is_fetched_at_zero_threshold() {
        let matrix = parse_matrix(shoes(), ",1_1,2_1\n1_1,4,\n2_1,,4\n".as_bytes()).unwrap();
        let catalog = InMemoryCatalog::new()
            .with_image(id("1_1"), shoes(), vec![1u8; 100])
            .with_image(id("2_1"), shoes(), vec![3u8; 300]);
        let service = CacheDecisionService::new(
            Arc::new(InMemorySimilarityRepository::new().with_matrix(matrix)),
            Arc::new(catalog),
        );

        let request = DecisionRequest::new(id("2_1"), shoes())
            .with_threshold(0)
            .with_cached([id("1_1")]);
        match service.decide(&request).await.unwrap() {
            Decision::Fetch(payload) => assert_eq!(payload.byte_size(), 300),
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unmatrixed_cached_image_is_not_reused() {
        let request = DecisionRequest::new(id("2_1"), shoes())
            .with_threshold(0)
            .with_cached([id("77_1")]);

        let decision = service().decide(&request).await.unwrap();
        assert!(!decision.is_reuse());
    }

    #[tokio::test]
    async fn test_fetch_requires_matching_category() {
        let mut catalog = MockImageCatalog::new();
        catalog
            .expect_category_of()
            .returning(|_| Ok(Some(CategoryKey::new("shop", "hats"))));
        catalog.expect_load_image().times(0);

        let service = CacheDecisionService::new(
            Arc::new(InMemorySimilarityRepository::new()),
            Arc::new(catalog),
        );

        let result = service.decide(&DecisionRequest::new(id("2_1"), shoes())).await;
        assert!(matches!(result, Err(DomainError::ImageNotFound { .. })));
    }

    #[tokio::test]
    async fn test_fetch_cannot_escape_image_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret_1.jpg"), b"TOP-SECRET").unwrap();

        let images = dir.path().join("srv").join("images");
        std::fs::create_dir_all(images.join("shop").join("shoes")).unwrap();
        std::fs::write(images.join("shop").join("shoes").join("1_1.jpg"), b"jpeg").unwrap();
        let map = dir.path().join("id_to_category.json");
        std::fs::write(&map, r#"{"1_1": "shop - shoes"}"#).unwrap();

        let catalog = FileSystemCatalog::load(&images, &map).await.unwrap();
        let service = CacheDecisionService::new(
            Arc::new(InMemorySimilarityRepository::new()),
            Arc::new(catalog),
        );

        assert!(matches!(
            CategoryKey::parse(".. - .."),
            Err(DomainError::Validation { .. })
        ));

        let escaping = CategoryKey::new("..", "..");
        let result = service
            .decide(&DecisionRequest::new(id("secret_1"), escaping))
            .await;
        assert!(matches!(result, Err(DomainError::ImageNotFound { .. })));

        match service
            .decide(&DecisionRequest::new(id("1_1"), shoes()))
            .await
            .unwrap()
        {
            Decision::Fetch(payload) => assert_eq!(payload.data.as_ref(), b"jpeg"),
            other => panic!("expected fetch, got {:?}", other),
        }
    }
}
