//! Durable client-side key/value storage.
//!
//! Values are plain strings keyed by name, the same shape a browser's local
//! storage offers. Every mutation takes a batch of keys and lands as a single
//! write, so callers that need two keys to change together get that for free.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, warn};

use crate::error::{ClientError, ClientResult};

/// Async string key/value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Write several values in one write
    async fn set_entries(&self, entries: &[(&str, &str)]) -> ClientResult<()>;

    /// Remove several keys in one write; missing keys are ignored
    async fn remove_entries(&self, keys: &[&str]) -> ClientResult<()>;
}

/// In-memory store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    /// True if the key is present
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set_entries(&self, entries: &[(&str, &str)]) -> ClientResult<()> {
        let mut values = self.lock();
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn remove_entries(&self, keys: &[&str]) -> ClientResult<()> {
        let mut values = self.lock();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

/// JSON-object file store.
///
/// The file is read lazily on first access. Writes go to a sibling temp file
/// that is then renamed over the original, so a crash mid-write leaves either
/// the old or the new contents on disk.
pub struct FileStore {
    path: PathBuf,
    cache: AsyncMutex<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: AsyncMutex::new(None),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> ClientResult<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Storage file not found, starting empty");
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to read storage file");
                return Err(ClientError::Storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
            Ok(values) => Ok(values),
            Err(e) => {
                // A corrupt file must not lock the user out; treat as empty
                warn!(path = %self.path.display(), error = %e, "Storage file is corrupt, ignoring contents");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_file(&self, values: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    ClientError::Storage(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(values)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized).await.map_err(|e| {
            ClientError::Storage(format!("failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to replace storage file");
            ClientError::Storage(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), keys = values.len(), "Storage file written");
        Ok(())
    }

    /// Apply a mutation to the cached map and persist it. The cache is only
    /// updated when the write succeeds.
    async fn mutate(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> ClientResult<()> {
        let mut cache = self.cache.lock().await;
        let mut next = match cache.as_ref() {
            Some(values) => values.clone(),
            None => self.read_file().await?,
        };
        apply(&mut next);
        self.write_file(&next).await?;
        *cache = Some(next);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.read_file().await?);
        }
        Ok(cache.as_ref().and_then(|values| values.get(key).cloned()))
    }

    async fn set_entries(&self, entries: &[(&str, &str)]) -> ClientResult<()> {
        self.mutate(|values| {
            for (key, value) in entries {
                values.insert(key.to_string(), value.to_string());
            }
        })
        .await
    }

    async fn remove_entries(&self, keys: &[&str]) -> ClientResult<()> {
        self.mutate(|values| {
            for key in keys {
                values.remove(*key);
            }
        })
        .await
    }
}
