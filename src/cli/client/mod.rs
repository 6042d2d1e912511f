//! Client commands - fetch one image, clear the local cache

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{CacheMode, FetchSource, ImageIdentity};
use crate::infrastructure::client::{ClientCacheStore, HttpDecisionClient, RequestCoordinator};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Image id, `{article}_{image}`
    pub image_id: String,

    /// Plain cache: never send cached ids to the service
    #[arg(long)]
    pub simple: bool,

    /// Minimum similarity score required for reuse
    #[arg(long)]
    pub threshold: Option<i32>,

    /// Decision service base URL
    #[arg(long)]
    pub server_url: Option<String>,

    /// Local cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ClearCacheArgs {
    /// Local cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Fetch one image through the persistent local cache
pub async fn fetch(args: FetchArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap();
    if let Some(url) = args.server_url {
        config.client.server_url = url;
    }

    let image = ImageIdentity::new(args.image_id)?;
    let mode = if args.simple {
        CacheMode::Simple
    } else {
        CacheMode::Similarity
    };
    let threshold = args.threshold.unwrap_or(config.client.default_threshold);

    let client = Arc::new(HttpDecisionClient::from_config(&config.client)?);
    let store = ClientCacheStore::restore(cache_dir(&config, args.cache_dir)).await?;
    let mut coordinator = RequestCoordinator::new(client, store);

    let outcome = coordinator.fetch(&image, mode, threshold).await?;

    info!(
        image_id = %image,
        effective = %outcome.effective,
        bytes = outcome.bytes_downloaded,
        mode = %mode,
        "Fetch complete"
    );

    match outcome.source {
        FetchSource::AlreadyCached => println!("{} already cached", image),
        FetchSource::Reused => println!("{} -> reuse cached {}", image, outcome.effective),
        FetchSource::Downloaded => {
            println!("{} downloaded ({} bytes)", image, outcome.bytes_downloaded)
        }
    }

    Ok(())
}

/// Empty the persistent local cache
pub async fn clear_cache(args: ClearCacheArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let dir = cache_dir(&config, args.cache_dir);

    let mut store = ClientCacheStore::restore(&dir).await?;
    let removed = store.len();
    store.clear().await?;

    info!(cache_dir = %dir.display(), removed = removed, "Cache cleared");
    println!("Removed {} cached images from {}", removed, dir.display());

    Ok(())
}

fn cache_dir(config: &AppConfig, overridden: Option<PathBuf>) -> PathBuf {
    overridden.unwrap_or_else(|| config.client.cache_dir.clone())
}
