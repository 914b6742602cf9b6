//! Table store double that can reject loads or log appends.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tabload_core::{DestinationTable, IngestionLogEntry, ParsedTable};
use tabload_warehouse::{
    DuckDbTableStore, LoadJob, TableStore, WarehouseError, WarehouseResult,
};

use super::TEST_PROJECT;

pub struct StubStore {
    inner: DuckDbTableStore,
    reject_loads: bool,
    fail_appends: bool,
    appends: AtomicUsize,
}

impl StubStore {
    /// Every `load_table` fails the way a store rejecting the data would.
    pub fn rejecting_loads() -> Self {
        Self::new(true, false)
    }

    /// Loads succeed, every `append_log` fails.
    pub fn failing_appends() -> Self {
        Self::new(false, true)
    }

    fn new(reject_loads: bool, fail_appends: bool) -> Self {
        Self {
            inner: DuckDbTableStore::in_memory(TEST_PROJECT).expect("open duckdb"),
            reject_loads,
            fail_appends,
            appends: AtomicUsize::new(0),
        }
    }

    pub fn append_attempts(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableStore for StubStore {
    fn project(&self) -> &str {
        self.inner.project()
    }

    async fn ensure_dataset(&self, dataset: &str) -> WarehouseResult<()> {
        self.inner.ensure_dataset(dataset).await
    }

    async fn list_datasets(&self) -> WarehouseResult<Vec<String>> {
        self.inner.list_datasets().await
    }

    async fn load_table(
        &self,
        destination: &DestinationTable,
        data: &ParsedTable,
    ) -> WarehouseResult<LoadJob> {
        if self.reject_loads {
            return Err(WarehouseError::LoadFailed(
                "Could not convert string 'abc' to INT64".to_string(),
            ));
        }
        self.inner.load_table(destination, data).await
    }

    async fn append_log(&self, dataset: &str, entry: &IngestionLogEntry) -> WarehouseResult<()> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends {
            return Err(WarehouseError::Backend("log table unavailable".to_string()));
        }
        self.inner.append_log(dataset, entry).await
    }

    async fn recent_log(
        &self,
        dataset: &str,
        limit: usize,
    ) -> WarehouseResult<Vec<IngestionLogEntry>> {
        self.inner.recent_log(dataset, limit).await
    }

    async fn row_count(&self, destination: &DestinationTable) -> WarehouseResult<u64> {
        self.inner.row_count(destination).await
    }

    async fn health_check(&self) -> WarehouseResult<()> {
        self.inner.health_check().await
    }
}
