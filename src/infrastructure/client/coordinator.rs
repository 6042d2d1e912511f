//! Request coordinator - one logical "get image" for one client

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::ClientCacheStore;
use crate::domain::{
    CacheEntry, CacheMode, Decision, DecisionClient, DecisionRequest, DomainError, FetchOutcome,
    ImageIdentity,
};

/// Drives the local cache and the decision service for one client
pub struct RequestCoordinator {
    client: Arc<dyn DecisionClient>,
    store: ClientCacheStore,
}

impl RequestCoordinator {
    pub fn new(client: Arc<dyn DecisionClient>, store: ClientCacheStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &ClientCacheStore {
        &self.store
    }

    pub fn into_store(self) -> ClientCacheStore {
        self.store
    }

    pub async fn clear_cache(&mut self) -> Result<(), DomainError> {
        self.store.clear().await
    }

    /// Gets `image`, reusing or downloading as the service decides
    ///
    /// An exact local hit never contacts the service. Reused images are not
    /// recorded; downloaded ones are.
    pub async fn fetch(
        &mut self,
        image: &ImageIdentity,
        mode: CacheMode,
        threshold: i32,
    ) -> Result<FetchOutcome, DomainError> {
        if self.store.contains(image) {
            debug!(image_id = %image, "Already cached");
            return Ok(FetchOutcome::already_cached(image.clone()));
        }

        let category = self.client.category_of(image).await?;

        let cached = if mode.sends_hints() {
            self.store.ids_in_category(&category)
        } else {
            BTreeSet::new()
        };

        let request = DecisionRequest::new(image.clone(), category)
            .with_threshold(threshold)
            .with_cached(cached);

        match self.client.request_image(&request).await? {
            Decision::Reuse { existing } => {
                if !self.store.contains(&existing) {
                    return Err(DomainError::protocol(format!(
                        "Server suggested reusing {} for {}, which is not cached",
                        existing, image
                    )));
                }

                info!(image_id = %image, reuse = %existing, mode = %mode, "Using cached image");
                Ok(FetchOutcome::reused(existing))
            }
            Decision::Fetch(payload) => {
                if &payload.id != image {
                    return Err(DomainError::protocol(format!(
                        "Requested {} but received {}",
                        image, payload.id
                    )));
                }

                let bytes = payload.byte_size();
                let entry = CacheEntry::new(payload.id.clone(), payload.category, bytes);
                self.store.record(entry, payload.data).await?;

                debug!(image_id = %image, bytes = bytes, mode = %mode, "Downloaded image");
                Ok(FetchOutcome::downloaded(payload.id, bytes))
            }
        }
    }
}

impl std::fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCoordinator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
