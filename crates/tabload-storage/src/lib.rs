//! Tabload Storage Library
//!
//! Object placement for uploaded tables: the `Storage` trait, object path rules, multi-bucket
//! placement and the backends (GCS, S3 and in-memory through `object_store`, local filesystem
//! through `tokio::fs`).
//!
//! # Object path format
//!
//! Objects are addressed by `(bucket, object_path)` where `object_path` is a normalized folder
//! prefix (empty, or ending in `/`) followed by the filename. Writing the same address twice
//! overwrites. Path rules live in the `keys` module so every backend agrees on them.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod placement;
#[cfg(feature = "storage-remote")]
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{normalize_folder, object_path, validate_bucket_name};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use placement::{place_in_buckets, PlacementOutcome};
#[cfg(feature = "storage-remote")]
pub use remote::ObjectStoreStorage;
pub use tabload_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
