//! Table store abstraction

use async_trait::async_trait;
use tabload_core::{DestinationTable, IngestionLogEntry, ParsedTable};
use uuid::Uuid;

use crate::error::WarehouseResult;

/// A completed load.
#[derive(Debug, Clone)]
pub struct LoadJob {
    pub job_id: Uuid,
    pub destination: DestinationTable,
    pub rows_loaded: u64,
    pub duration_ms: f64,
}

/// Analytical table store addressed as `project.dataset.table`.
///
/// Every call blocks until the store has finished; no call is retried.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Project (catalog) this store writes into.
    fn project(&self) -> &str;

    /// Create the dataset and its `ingestion_log` table if missing.
    async fn ensure_dataset(&self, dataset: &str) -> WarehouseResult<()>;

    async fn list_datasets(&self) -> WarehouseResult<Vec<String>>;

    /// Replace `destination` with `data`, inferring column types from the values.
    async fn load_table(
        &self,
        destination: &DestinationTable,
        data: &ParsedTable,
    ) -> WarehouseResult<LoadJob>;

    async fn append_log(&self, dataset: &str, entry: &IngestionLogEntry) -> WarehouseResult<()>;

    /// Newest entries first. A dataset without a log yields an empty list.
    async fn recent_log(&self, dataset: &str, limit: usize)
        -> WarehouseResult<Vec<IngestionLogEntry>>;

    async fn row_count(&self, destination: &DestinationTable) -> WarehouseResult<u64>;

    async fn health_check(&self) -> WarehouseResult<()>;
}
