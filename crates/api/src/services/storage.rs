//! Storage backend for uploaded request images.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Stored file not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Readable handle to a stored file.
pub type StoredFile = Box<dyn AsyncRead + Send + Unpin>;

/// Key-addressed blob storage for images.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    async fn open(&self, key: &str) -> Result<StoredFile, StorageError>;

    /// Removes a file. Missing files are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage key for a new image of `request_id`, keeping the original extension.
pub fn image_key(request_id: Uuid, file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    format!("requests/{}/{}.{}", request_id, Uuid::new_v4(), extension)
}

/// Images stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    root: PathBuf,
}

impl LocalImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a key to a path under the root, refusing anything that escapes it.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        tracing::debug!(key = %key, size = bytes.len(), "Stored image");
        Ok(())
    }

    async fn open(&self, key: &str) -> Result<StoredFile, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Best-effort removal of several files; failures are logged.
pub async fn remove_all(storage: &dyn ImageStorage, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to remove stored image");
        }
    }
}
