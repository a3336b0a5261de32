//! Durable key-value storage backends.
//!
//! The connection manager persists its selection state through this seam so
//! it survives restarts. Two implementations are provided: an in-memory store
//! for tests and ephemeral use, and a file-backed store that keeps one file
//! per key.

use crate::error::StorageResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

/// Trait for durable key-value storage backends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value for a key, `None` if absent.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write the value for a key, overwriting any prior value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory key-value store.
///
/// Fast but not persistent across restarts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// File-backed key-value store.
///
/// Persists each key as its own file under a base directory.
#[derive(Debug)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a file store with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create a file store in the default location (`~/.wallethub/store`).
    #[must_use]
    pub fn default_path() -> Self {
        let path = dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wallethub")
            .join("store");
        Self::new(path)
    }

    /// Get the file path for a key.
    fn key_path(&self, key: &str) -> PathBuf {
        // Sanitize key for filename
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.base_path.join(safe_key)
    }

    /// Ensure the storage directory exists.
    async fn ensure_dir(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let value = tokio::fs::read_to_string(&path).await?;
        debug!(key = %key, "loaded value from file");
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_dir().await?;

        let path = self.key_path(key);
        tokio::fs::write(&path, value).await?;
        debug!(key = %key, "saved value to file");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key);

        if path.exists() {
            tokio::fs::remove_file(&path).await?;
            debug!(key = %key, "removed value file");
        }
        Ok(())
    }
}
