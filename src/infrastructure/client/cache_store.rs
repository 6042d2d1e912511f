//! Client-side record of downloaded images

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::domain::{CacheEntry, CategoryKey, DomainError, ImageIdentity};

const METADATA_FILE: &str = "cache_metadata.json";

/// Images one client has materialized, in insertion order
///
/// Owned by exactly one client. The persistent variant mirrors every change
/// to `{root}/cache_metadata.json` and keeps image bytes as `{root}/{id}.jpg`.
#[derive(Debug)]
pub struct ClientCacheStore {
    root: Option<PathBuf>,
    entries: Vec<CacheEntry>,
    ids: HashSet<ImageIdentity>,
    /// Bytes for the in-memory variant only
    blobs: HashMap<ImageIdentity, Bytes>,
}

impl ClientCacheStore {
    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            root: None,
            entries: Vec::new(),
            ids: HashSet::new(),
            blobs: HashMap::new(),
        }
    }

    /// Opens the store at `root`
    ///
    /// A missing or unreadable metadata file yields an empty store.
    pub async fn restore(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        let mut store = Self {
            root: Some(root.clone()),
            ..Self::in_memory()
        };

        let path = root.join(METADATA_FILE);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cache metadata, starting empty");
                return Ok(store);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache metadata, starting empty");
                return Ok(store);
            }
        };

        let entries: Vec<CacheEntry> = match serde_json::from_slice(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache metadata, starting empty");
                return Ok(store);
            }
        };

        for entry in entries {
            if store.ids.insert(entry.id.clone()) {
                store.entries.push(entry);
            } else {
                warn!(image_id = %entry.id, "Dropping duplicate cache metadata entry");
            }
        }

        debug!(entries = store.entries.len(), "Restored client cache");
        Ok(store)
    }

    pub fn is_persistent(&self) -> bool {
        self.root.is_some()
    }

    pub fn contains(&self, id: &ImageIdentity) -> bool {
        self.ids.contains(id)
    }

    pub fn ids_in_category(&self, category: &CategoryKey) -> BTreeSet<ImageIdentity> {
        self.entries
            .iter()
            .filter(|e| &e.category == category)
            .map(|e| e.id.clone())
            .collect()
    }

    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total bytes of all cached images
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.byte_size).sum()
    }

    /// Appends an entry together with its image bytes
    ///
    /// Fails with `DuplicateCacheEntry` if the id is already present.
    pub async fn record(&mut self, entry: CacheEntry, data: Bytes) -> Result<(), DomainError> {
        if self.contains(&entry.id) {
            return Err(DomainError::duplicate_cache_entry(entry.id.to_string()));
        }

        let Some(root) = self.root.clone() else {
            self.ids.insert(entry.id.clone());
            self.blobs.insert(entry.id.clone(), data);
            self.entries.push(entry);
            return Ok(());
        };

        let path = image_path(&root, &entry.id);
        write_atomically(&path, &data).await?;

        self.ids.insert(entry.id.clone());
        self.entries.push(entry);

        if let Err(e) = self.persist().await {
            if let Some(entry) = self.entries.pop() {
                self.ids.remove(&entry.id);
            }
            if let Err(remove) = tokio::fs::remove_file(&path).await {
                if remove.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %remove, "Failed to remove uncommitted image");
                }
            }
            return Err(e);
        }

        Ok(())
    }

    /// Raw bytes of a cached image
    pub async fn image_bytes(&self, id: &ImageIdentity) -> Result<Option<Bytes>, DomainError> {
        if !self.contains(id) {
            return Ok(None);
        }

        let Some(root) = &self.root else {
            return Ok(self.blobs.get(id).cloned());
        };

        match tokio::fs::read(image_path(root, id)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Empties the store and its backing files
    ///
    /// The empty metadata file is committed before anything else changes, so
    /// a failure leaves the previous state intact.
    pub async fn clear(&mut self) -> Result<(), DomainError> {
        if let Some(root) = &self.root {
            write_atomically(&root.join(METADATA_FILE), b"[]").await?;

            for entry in &self.entries {
                if let Err(e) = tokio::fs::remove_file(image_path(root, &entry.id)).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(image_id = %entry.id, error = %e, "Failed to remove cached image");
                    }
                }
            }
        }

        self.entries.clear();
        self.ids.clear();
        self.blobs.clear();
        Ok(())
    }

    /// Writes the metadata file; no-op for the in-memory variant
    pub async fn persist(&self) -> Result<(), DomainError> {
        let Some(root) = &self.root else {
            return Ok(());
        };

        let json = serde_json::to_vec(&self.entries)
            .map_err(|e| DomainError::internal(format!("Failed to serialize cache metadata: {}", e)))?;

        write_atomically(&root.join(METADATA_FILE), &json).await
    }
}

fn image_path(root: &Path, id: &ImageIdentity) -> PathBuf {
    root.join(format!("{}.jpg", id))
}

/// Write to a sibling temp file, sync, then rename over `path`
async fn write_atomically(path: &Path, data: &[u8]) -> Result<(), DomainError> {
    let tmp = path.with_extension("tmp");

    {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await?;
    }

    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        DomainError::storage(format!("Failed to commit {}: {}", path.display(), e))
    })
}
