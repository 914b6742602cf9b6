//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use tabload_core::{AppError, StoredObject};
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

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid bucket name: {0}")]
    InvalidBucket(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::ObjectNotFound(key),
            StorageError::InvalidKey(_) | StorageError::InvalidBucket(_) => {
                AppError::InvalidInput(err.to_string())
            }
            other => AppError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (GCS, S3, in-memory, local filesystem) implement this trait, so the
/// upload and notification paths never depend on a specific backend.
///
/// **Addressing:** objects are identified by `(bucket, object_path)`; build paths with
/// [`crate::keys::object_path`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` to `bucket/object_path`, overwriting any existing object.
    async fn upload(
        &self,
        bucket: &str,
        object_path: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject>;

    /// Read the full content of `bucket/object_path`.
    ///
    /// Returns [`StorageError::NotFound`] when the object does not exist.
    async fn download(&self, bucket: &str, object_path: &str) -> StorageResult<Bytes>;

    /// Check if an object exists
    async fn exists(&self, bucket: &str, object_path: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_app_error() {
        let app: AppError = StorageError::NotFound("b/data.csv".to_string()).into();
        assert!(matches!(app, AppError::ObjectNotFound(ref k) if k == "b/data.csv"));

        let app: AppError = StorageError::InvalidKey("../x".to_string()).into();
        assert!(matches!(app, AppError::InvalidInput(_)));

        let app: AppError = StorageError::UploadFailed("timeout".to_string()).into();
        assert!(matches!(app, AppError::StorageUnavailable(_)));
    }
}
