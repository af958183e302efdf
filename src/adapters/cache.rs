//! Cache targets for published collections.
//!
//! The loader only ever writes; reading back is offered for hosts that
//! consume the cache in-process and for tests.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::domain::Collection;

/// Errors that can occur writing to a cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache write task failed: {0}")]
    Task(String),
}

/// Keyed store that receives a whole collection at once
#[async_trait]
pub trait ContentCache: Send + Sync {
    async fn write(&self, key: &str, collection: &Collection) -> Result<(), CacheError>;
}

/// On-disk envelope for one cache key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub written_at: DateTime<Utc>,
    pub records: Collection,
}

/// One JSON file per key inside a directory
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location (~/.training-loader/cache)
    pub fn default_dir() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".training-loader").join("cache"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a key: SHA256(key)[0:16].json
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(&digest[..8])))
    }

    /// Read back the last collection written under a key
    pub async fn read(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

#[async_trait]
impl ContentCache for JsonFileCache {
    async fn write(&self, key: &str, collection: &Collection) -> Result<(), CacheError> {
        let entry = CacheEntry {
            key: key.to_string(),
            written_at: Utc::now(),
            records: collection.clone(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        let dir = self.dir.clone();
        let path = self.entry_path(key);

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, json.as_bytes()))
            .await
            .map_err(|e| CacheError::Task(e.to_string()))??;

        Ok(())
    }
}

/// Replace a file's contents atomically.
///
/// The new body is staged in a temp file beside the target and renamed over
/// it, so readers see either the old or the new collection. Concurrent
/// writers serialize on an exclusive lock of `<entry>.lock`.
fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    std::fs::create_dir_all(dir)?;

    let lock = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path.with_extension("lock"))?;
    lock.lock_exclusive()?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| CacheError::Io(e.error))?;

    // Lock is released when `lock` is dropped
    Ok(())
}

/// In-process cache, keyed like the file cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Collection>>,
    writes: Mutex<HashMap<String, usize>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Collection> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// How many times a key has been written
    pub fn write_count(&self, key: &str) -> usize {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn write(&self, key: &str, collection: &Collection) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), collection.clone());
        *self
            .writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.to_string())
            .or_insert(0) += 1;
        Ok(())
    }
}
