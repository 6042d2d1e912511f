//! Client-side cache entry and fetch outcome types

use serde::{Deserialize, Serialize};

use crate::domain::image::{CategoryKey, ImageIdentity};

/// One image a client has materialized locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: ImageIdentity,
    pub category: CategoryKey,
    #[serde(default)]
    pub byte_size: u64,
}

impl CacheEntry {
    pub fn new(id: ImageIdentity, category: CategoryKey, byte_size: u64) -> Self {
        Self {
            id,
            category,
            byte_size,
        }
    }
}

/// How a client consults the decision service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Send the in-category cached ids so the server may pick a substitute
    #[default]
    Similarity,
    /// Never send hints; only exact repeats are avoided
    Simple,
}

impl CacheMode {
    pub fn sends_hints(self) -> bool {
        matches!(self, Self::Similarity)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Similarity => "similarity",
            Self::Simple => "simple",
        }
    }
}

impl std::fmt::Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the image shown for a fetch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// The exact image was already in the local cache
    AlreadyCached,
    /// A similar cached image was substituted
    Reused,
    /// The image bytes were downloaded
    Downloaded,
}

/// Result of one logical "get image" operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Image to display; differs from the requested one on reuse
    pub effective: ImageIdentity,
    pub bytes_downloaded: u64,
    pub source: FetchSource,
}

impl FetchOutcome {
    pub fn already_cached(id: ImageIdentity) -> Self {
        Self {
            effective: id,
            bytes_downloaded: 0,
            source: FetchSource::AlreadyCached,
        }
    }

    pub fn reused(existing: ImageIdentity) -> Self {
        Self {
            effective: existing,
            bytes_downloaded: 0,
            source: FetchSource::Reused,
        }
    }

    pub fn downloaded(id: ImageIdentity, bytes: u64) -> Self {
        Self {
            effective: id,
            bytes_downloaded: bytes,
            source: FetchSource::Downloaded,
        }
    }
}
