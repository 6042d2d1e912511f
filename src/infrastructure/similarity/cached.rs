//! Load-once matrix cache using moka

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::image::CategoryKey;
use crate::domain::similarity::{SimilarityMatrix, SimilarityRepository};
use crate::domain::DomainError;

/// Keeps parsed matrices in memory, keyed by category
///
/// Concurrent first loads of the same category are coalesced by moka into
/// a single call to the inner repository. Failed loads are not cached.
/// Matrices are static for the process lifetime, so there is no TTL.
pub struct CachedSimilarityRepository {
    inner: Arc<dyn SimilarityRepository>,
    cache: MokaCache<CategoryKey, Arc<SimilarityMatrix>>,
}

impl CachedSimilarityRepository {
    pub fn new(inner: Arc<dyn SimilarityRepository>, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }

    pub fn cached_categories(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl std::fmt::Debug for CachedSimilarityRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSimilarityRepository")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl SimilarityRepository for CachedSimilarityRepository {
    async fn load(&self, category: &CategoryKey) -> Result<Arc<SimilarityMatrix>, DomainError> {
        let inner = Arc::clone(&self.inner);
        let key = category.clone();

        self.cache
            .try_get_with(category.clone(), async move {
                debug!(category = %key, "Similarity matrix cache miss");
                inner.load(&key).await
            })
            .await
            .map_err(|e: Arc<DomainError>| (*e).clone())
    }
}
