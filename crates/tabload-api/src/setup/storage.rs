//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use tabload_core::Config;
use tabload_storage::{create_storage, Storage};

/// Open the object store client. `None` when `PROJECT_ID` is unset; uploads then report
/// storage as unavailable.
pub async fn setup_storage(config: &Config) -> Result<Option<Arc<dyn Storage>>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config).await?;

    match &storage {
        Some(storage) => tracing::info!(
            backend = ?storage.backend_type(),
            buckets = config.buckets().len(),
            "Storage abstraction initialized successfully"
        ),
        None => tracing::warn!("PROJECT_ID not set, object storage disabled"),
    }

    Ok(storage)
}
