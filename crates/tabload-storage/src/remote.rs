//! `object_store`-backed storage: GCS, S3 and in-memory.
//!
//! One client per bucket is built on first use and cached for the life of the process.

use crate::keys::{validate_bucket_name, validate_object_path};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tabload_core::StoredObject;

/// Connection settings for the remote backends.
#[derive(Debug, Clone)]
enum RemoteKind {
    Gcs,
    S3 {
        region: String,
        endpoint_url: Option<String>,
    },
    Memory,
}

/// Storage over any `object_store` backend.
pub struct ObjectStoreStorage {
    kind: RemoteKind,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreStorage {
    /// Google Cloud Storage. Credentials come from the environment
    /// (`GOOGLE_APPLICATION_CREDENTIALS` / `GOOGLE_SERVICE_ACCOUNT`).
    pub fn gcs() -> Self {
        Self::with_kind(RemoteKind::Gcs)
    }

    /// S3 or an S3-compatible provider
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn s3(region: String, endpoint_url: Option<String>) -> Self {
        Self::with_kind(RemoteKind::S3 {
            region,
            endpoint_url,
        })
    }

    /// Process-local buckets, lost on exit.
    pub fn in_memory() -> Self {
        Self::with_kind(RemoteKind::Memory)
    }

    fn with_kind(kind: RemoteKind) -> Self {
        Self {
            kind,
            stores: Mutex::new(HashMap::new()),
        }
    }

    fn build_store(&self, bucket: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        match &self.kind {
            RemoteKind::Gcs => {
                let store = GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket)
                    .build()
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?;
                Ok(Arc::new(store))
            }
            RemoteKind::S3 {
                region,
                endpoint_url,
            } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_region(region.clone())
                    .with_bucket_name(bucket);

                if let Some(endpoint) = endpoint_url {
                    let allow_http = endpoint.starts_with("http://");
                    builder = builder
                        .with_endpoint(endpoint.clone())
                        .with_allow_http(allow_http);
                }

                let store = builder
                    .build()
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?;
                Ok(Arc::new(store))
            }
            RemoteKind::Memory => Ok(Arc::new(InMemory::new())),
        }
    }

    fn store_for(&self, bucket: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        validate_bucket_name(bucket)?;

        let mut stores = self
            .stores
            .lock()
            .map_err(|_| StorageError::BackendError("bucket client cache poisoned".to_string()))?;

        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let store = self.build_store(bucket)?;
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }

    fn generate_url(&self, bucket: &str, object_path: &str) -> String {
        match &self.kind {
            RemoteKind::Gcs => format!("gs://{}/{}", bucket, object_path),
            RemoteKind::S3 {
                endpoint_url: Some(endpoint),
                ..
            } => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, object_path),
            RemoteKind::S3 { .. } => format!("s3://{}/{}", bucket, object_path),
            RemoteKind::Memory => format!("memory://{}/{}", bucket, object_path),
        }
    }
}

#[async_trait]
impl Storage for ObjectStoreStorage {
    async fn upload(
        &self,
        bucket: &str,
        object_path: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        validate_object_path(object_path)?;
        let store = self.store_for(bucket)?;
        let size = data.len() as u64;
        let location = Path::from(object_path);

        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = store
            .put_opts(&location, PutPayload::from(data), opts)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                object_path = %object_path,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object store upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            backend = %self.backend_type(),
            bucket = %bucket,
            object_path = %object_path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store upload successful"
        );

        Ok(StoredObject {
            bucket: bucket.to_string(),
            object_path: object_path.to_string(),
            size_bytes: size,
            url: self.generate_url(bucket, object_path),
        })
    }

    async fn download(&self, bucket: &str, object_path: &str) -> StorageResult<Bytes> {
        validate_object_path(object_path)?;
        let store = self.store_for(bucket)?;
        let start = std::time::Instant::now();
        let location = Path::from(object_path);

        let result: ObjectResult<_> = store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => {
                StorageError::NotFound(format!("{}/{}", bucket, object_path))
            }
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %bucket,
                    object_path = %object_path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object store download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %bucket,
            object_path = %object_path,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object store download successful"
        );

        Ok(bytes)
    }

    async fn exists(&self, bucket: &str, object_path: &str) -> StorageResult<bool> {
        validate_object_path(object_path)?;
        let store = self.store_for(bucket)?;
        let location = Path::from(object_path);

        match store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        match self.kind {
            RemoteKind::Gcs => StorageBackend::Gcs,
            RemoteKind::S3 { .. } => StorageBackend::S3,
            RemoteKind::Memory => StorageBackend::Memory,
        }
    }
}
