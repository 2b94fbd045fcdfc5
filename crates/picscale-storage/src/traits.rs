//! Storage abstraction trait

use async_trait::async_trait;
use picscale_core::ObjectMetadata;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A downloaded object: raw bytes plus the user metadata attached to it.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub metadata: ObjectMetadata,
}

/// Object storage abstraction
///
/// The processing pipeline reads source images and writes derivatives
/// through this trait, without coupling to a specific backend.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Download an object and its user metadata.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<StoredObject>;

    /// Upload an object under the given key with an explicit content type.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;
}
