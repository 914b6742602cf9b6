//! Table store setup and initialization

use anyhow::{Context, Result};
use tabload_core::Config;
use tabload_warehouse::{create_table_store, TableLoader};

/// Open the table store and make sure the default dataset exists.
///
/// Without `PROJECT_ID` the loader is unconfigured and every load fails with a clear message.
pub async fn setup_warehouse(config: &Config) -> Result<TableLoader> {
    tracing::info!("Initializing table store...");
    let store = create_table_store(config).context("Failed to open table store")?;

    let Some(store) = store else {
        tracing::warn!("PROJECT_ID not set, table loading disabled");
        return Ok(TableLoader::new(None));
    };

    store
        .ensure_dataset(config.default_dataset())
        .await
        .with_context(|| format!("Failed to create dataset {}", config.default_dataset()))?;

    tracing::info!(
        project = %store.project(),
        dataset = %config.default_dataset(),
        persistent = config.warehouse_path().is_some(),
        "Table store initialized successfully"
    );

    Ok(TableLoader::new(Some(store)))
}
