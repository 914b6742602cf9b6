#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-remote")]
use crate::ObjectStoreStorage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tabload_core::Config;

/// Create a storage backend based on configuration.
///
/// Returns `Ok(None)` when no `PROJECT_ID` is configured: object storage is then unavailable
/// and every operation needing it reports `StorageUnavailable`.
pub async fn create_storage(config: &Config) -> StorageResult<Option<Arc<dyn Storage>>> {
    if config.project_id().is_none() {
        return Ok(None);
    }

    let storage: Arc<dyn Storage> = match config.storage_backend() {
        #[cfg(feature = "storage-remote")]
        StorageBackend::Gcs => Arc::new(ObjectStoreStorage::gcs()),

        #[cfg(feature = "storage-remote")]
        StorageBackend::S3 => {
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint().map(String::from);
            Arc::new(ObjectStoreStorage::s3(region, endpoint))
        }

        #[cfg(feature = "storage-remote")]
        StorageBackend::Memory => Arc::new(ObjectStoreStorage::in_memory()),

        #[cfg(not(feature = "storage-remote"))]
        StorageBackend::Gcs | StorageBackend::S3 | StorageBackend::Memory => {
            return Err(StorageError::ConfigError(
                "Remote storage backends not available (storage-remote feature not enabled)"
                    .to_string(),
            ))
        }

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
            Arc::new(LocalStorage::new(base_path).await?)
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => {
            return Err(StorageError::ConfigError(
                "Local storage backend not available (storage-local feature not enabled)"
                    .to_string(),
            ))
        }
    };

    Ok(Some(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabload_core::IngestConfig;

    fn config(pairs: &[(&str, String)]) -> Config {
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        };
        Config(Box::new(IngestConfig::from_lookup(lookup).unwrap()))
    }

    #[tokio::test]
    async fn test_no_project_means_no_storage() {
        let storage = create_storage(&config(&[])).await.unwrap();
        assert!(storage.is_none());
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let cfg = config(&[
            ("PROJECT_ID", "demo".to_string()),
            ("STORAGE_BACKEND", "memory".to_string()),
        ]);
        let storage = create_storage(&cfg).await.unwrap().unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
    }

    #[tokio::test]
    async fn test_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&[
            ("PROJECT_ID", "demo".to_string()),
            ("STORAGE_BACKEND", "local".to_string()),
            ("LOCAL_STORAGE_PATH", dir.path().display().to_string()),
        ]);
        let storage = create_storage(&cfg).await.unwrap().unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
