//! Similarity-aware image cache
//!
//! Clients ask a decision service for images; when a cached image of the
//! same category is similar enough, the service tells the client to reuse it
//! instead of sending bytes. Includes:
//! - HTTP decision service backed by per-category similarity matrices
//! - Client cache store and request coordinator
//! - Simulation harness comparing similarity reuse against a plain cache

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{DecisionService, ImageCatalog, SimilarityRepository};
use infrastructure::{
    catalog::FileSystemCatalog,
    services::CacheDecisionService,
    similarity::{CachedSimilarityRepository, CsvSimilarityRepository},
};
use tracing::info;

/// Create the application state with the default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
///
/// Loads the category map eagerly; similarity matrices are parsed on first
/// use and kept in a bounded cache.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let catalog: Arc<dyn ImageCatalog> = Arc::new(
        FileSystemCatalog::load(config.data.image_dir.clone(), &config.data.category_map).await?,
    );

    let similarity: Arc<dyn SimilarityRepository> = Arc::new(CachedSimilarityRepository::new(
        Arc::new(CsvSimilarityRepository::new(config.data.image_dir.clone())),
        config.decision.matrix_cache_capacity,
    ));

    let decision_service: Arc<dyn DecisionService> =
        Arc::new(CacheDecisionService::new(similarity, catalog.clone()));

    info!(
        image_dir = %config.data.image_dir.display(),
        matrix_cache_capacity = config.decision.matrix_cache_capacity,
        "Application state created"
    );

    Ok(AppState::new(decision_service, catalog))
}
