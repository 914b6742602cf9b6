//! Table loader: one parsed table in, one replaced destination table and one log row out.

use std::sync::Arc;

use tabload_core::{DestinationTable, IngestionLogEntry, ParsedTable};
use uuid::Uuid;

use crate::error::{WarehouseError, WarehouseResult};
use crate::naming::{is_reserved_table_name, sanitize_table_name, validate_dataset_name};
use crate::traits::TableStore;

/// Summary of a successful load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub job_id: Uuid,
    pub destination: DestinationTable,
    pub rows_loaded: u64,
    /// `false` when the table was replaced but its `OK` log row could not be appended.
    pub log_recorded: bool,
}

/// Loads tables through an optional [`TableStore`]. Without a store every load reports
/// `Unconfigured` before touching anything.
#[derive(Clone)]
pub struct TableLoader {
    store: Option<Arc<dyn TableStore>>,
}

impl TableLoader {
    pub fn new(store: Option<Arc<dyn TableStore>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Option<&Arc<dyn TableStore>> {
        self.store.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    fn configured_store(&self, dataset: &str) -> WarehouseResult<&Arc<dyn TableStore>> {
        let store = self.store.as_ref().ok_or_else(|| {
            WarehouseError::Unconfigured("table store not configured (PROJECT_ID not set)".into())
        })?;
        if dataset.trim().is_empty() {
            return Err(WarehouseError::Unconfigured("no dataset selected".to_string()));
        }
        validate_dataset_name(dataset)?;
        Ok(store)
    }

    /// Replace `{project}.{dataset}.{sanitized object name}` with `table` and append one
    /// `OK` log row. A rejected load appends one `ERROR:` row instead and returns `LoadFailed`.
    ///
    /// Once the table is replaced the load counts as done: a failing log append is reported
    /// through [`LoadReport::log_recorded`], never as an error.
    pub async fn load(
        &self,
        table: &ParsedTable,
        bucket: &str,
        object_name: &str,
        dataset: &str,
    ) -> WarehouseResult<LoadReport> {
        let store = self.configured_store(dataset)?;
        store.ensure_dataset(dataset).await?;

        let destination = DestinationTable::new(
            store.project(),
            dataset,
            sanitize_table_name(object_name),
        );

        if is_reserved_table_name(&destination.table) {
            let err = WarehouseError::LoadFailed(format!(
                "table name '{}' is reserved",
                destination.table
            ));
            return Err(reject_load(store, &destination, bucket, object_name, err).await);
        }

        let job = match store.load_table(&destination, table).await {
            Ok(job) => job,
            Err(err) => {
                return Err(reject_load(store, &destination, bucket, object_name, err).await);
            }
        };

        let entry = IngestionLogEntry::success(bucket, object_name, table.row_count() as u64);
        let log_recorded = match store.append_log(dataset, &entry).await {
            Ok(()) => true,
            Err(log_err) => {
                tracing::error!(
                    destination = %destination,
                    error = %log_err,
                    "Table replaced but ingestion log entry could not be appended"
                );
                false
            }
        };

        tracing::info!(
            job_id = %job.job_id,
            destination = %destination,
            bucket = %bucket,
            object_name = %object_name,
            rows_loaded = entry.rows_loaded,
            duration_ms = job.duration_ms,
            "Table loaded"
        );

        Ok(LoadReport {
            job_id: job.job_id,
            destination,
            rows_loaded: entry.rows_loaded,
            log_recorded,
        })
    }

    /// Append a failure row for an attempt that never reached the load step.
    ///
    /// Does nothing without a store; the caller keeps its in-memory record either way.
    pub async fn record_failure(
        &self,
        dataset: &str,
        entry: &IngestionLogEntry,
    ) -> WarehouseResult<()> {
        let Some(store) = self.store.as_ref() else {
            return Ok(());
        };
        validate_dataset_name(dataset)?;
        store.ensure_dataset(dataset).await?;
        store.append_log(dataset, entry).await
    }
}

/// Append the `ERROR:` row for a load the store never completed and turn `err` into
/// `LoadFailed`.
async fn reject_load(
    store: &Arc<dyn TableStore>,
    destination: &DestinationTable,
    bucket: &str,
    object_name: &str,
    err: WarehouseError,
) -> WarehouseError {
    tracing::warn!(
        destination = %destination,
        bucket = %bucket,
        object_name = %object_name,
        error = %err,
        "Load into table store failed"
    );
    let entry = IngestionLogEntry::failure(bucket, object_name, format!("Load job failed: {}", err));
    if let Err(log_err) = store.append_log(&destination.dataset, &entry).await {
        tracing::error!(error = %log_err, "Failed to append ingestion log entry");
    }
    match err {
        WarehouseError::LoadFailed(msg) => WarehouseError::LoadFailed(msg),
        other => WarehouseError::LoadFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LoadJob;
    use crate::DuckDbTableStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// DuckDB store that can reject loads or log appends.
    struct StubStore {
        inner: DuckDbTableStore,
        reject_loads: bool,
        fail_appends: bool,
        appends: AtomicUsize,
    }

    impl StubStore {
        fn new(reject_loads: bool, fail_appends: bool) -> Self {
            Self {
                inner: DuckDbTableStore::in_memory("p1").unwrap(),
                reject_loads,
                fail_appends,
                appends: AtomicUsize::new(0),
            }
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

    fn sales() -> ParsedTable {
        ParsedTable::new(
            vec!["id".into(), "amount".into()],
            vec![
                vec![Some("1".into()), Some("10".into())],
                vec![Some("2".into()), Some("20".into())],
                vec![Some("3".into()), Some("30".into())],
            ],
        )
    }

    fn loader() -> (TableLoader, Arc<dyn TableStore>) {
        let store: Arc<dyn TableStore> = Arc::new(DuckDbTableStore::in_memory("p1").unwrap());
        (TableLoader::new(Some(Arc::clone(&store))), store)
    }

    #[tokio::test]
    async fn test_unconfigured_loader_fails_before_loading() {
        let loader = TableLoader::new(None);
        let err = loader.load(&sales(), "b", "sales.csv", "uploads").await.unwrap_err();
        assert!(matches!(err, WarehouseError::Unconfigured(_)));
        assert!(!loader.is_configured());
    }

    #[tokio::test]
    async fn test_blank_dataset_is_unconfigured() {
        let (loader, _) = loader();
        let err = loader.load(&sales(), "b", "sales.csv", " ").await.unwrap_err();
        assert!(matches!(err, WarehouseError::Unconfigured(_)));
    }

    #[tokio::test]
    async fn test_load_derives_table_and_logs_once() {
        let (loader, store) = loader();
        let report = loader
            .load(&sales(), "b", "incoming/sales.csv", "uploads")
            .await
            .unwrap();

        assert_eq!(report.destination, DestinationTable::new("p1", "uploads", "sales"));
        assert_eq!(report.rows_loaded, 3);

        let log = store.recent_log("uploads", 10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].bucket, "b");
        assert_eq!(log[0].object_name, "incoming/sales.csv");
        assert_eq!(log[0].status.to_string(), "OK");
    }

    #[tokio::test]
    async fn test_loading_twice_keeps_one_copy_and_two_log_rows() {
        let (loader, store) = loader();
        loader.load(&sales(), "b", "sales.csv", "uploads").await.unwrap();
        let report = loader.load(&sales(), "b", "sales.csv", "uploads").await.unwrap();

        assert_eq!(store.row_count(&report.destination).await.unwrap(), 3);
        assert_eq!(store.recent_log("uploads", 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_colliding_names_clobber_previous_table() {
        let (loader, store) = loader();
        loader.load(&sales(), "b", "a/sales.csv", "uploads").await.unwrap();

        let other = ParsedTable::new(vec!["region".into()], vec![vec![Some("north".into())]]);
        let report = loader.load(&other, "b", "b/sales.xlsx", "uploads").await.unwrap();

        assert_eq!(report.destination.table, "sales");
        assert_eq!(store.row_count(&report.destination).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_datasets_are_independent() {
        let (loader, store) = loader();
        loader.load(&sales(), "b", "sales.csv", "team_a").await.unwrap();

        assert_eq!(store.recent_log("team_a", 10).await.unwrap().len(), 1);
        assert!(store.recent_log("uploads", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_failure() {
        let (loader, store) = loader();
        let entry = IngestionLogEntry::failure("b", "", "Missing event fields: name");
        loader.record_failure("uploads", &entry).await.unwrap();

        let log = store.recent_log("uploads", 10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].rows_loaded, 0);
        assert!(log[0].status.to_string().starts_with("ERROR:"));

        TableLoader::new(None).record_failure("uploads", &entry).await.unwrap();
    }

    #[tokio::test]
    async fn test_log_table_name_is_rejected_and_history_survives() {
        let (loader, store) = loader();
        loader.load(&sales(), "b", "sales.csv", "uploads").await.unwrap();

        let clash = ParsedTable::new(vec!["x".into()], vec![vec![Some("1".into())]]);
        let err = loader
            .load(&clash, "b", "x/ingestion-log.xlsx", "uploads")
            .await
            .unwrap_err();
        assert!(matches!(err, WarehouseError::LoadFailed(ref m) if m.contains("reserved")));

        let log = store.recent_log("uploads", 10).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].object_name, "x/ingestion-log.xlsx");
        assert_eq!(log[0].rows_loaded, 0);
        assert!(log[0].status.to_string().starts_with("ERROR: Load job failed"));
        assert_eq!(log[1].object_name, "sales.csv");
        assert!(log[1].status.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_load_logs_one_error_row() {
        let store = Arc::new(StubStore::new(true, false));
        let loader = TableLoader::new(Some(store.clone() as Arc<dyn TableStore>));

        let err = loader.load(&sales(), "b", "sales.csv", "uploads").await.unwrap_err();
        assert!(matches!(err, WarehouseError::LoadFailed(ref m) if m.contains("INT64")));

        let log = store.recent_log("uploads", 10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].rows_loaded, 0);
        assert!(log[0].status.to_string().starts_with("ERROR: Load job failed"));
        assert!(!log.iter().any(|entry| entry.status.is_ok()));
    }

    #[tokio::test]
    async fn test_failed_log_append_after_load_is_not_an_error() {
        let store = Arc::new(StubStore::new(false, true));
        let loader = TableLoader::new(Some(store.clone() as Arc<dyn TableStore>));

        let report = loader.load(&sales(), "b", "sales.csv", "uploads").await.unwrap();

        assert_eq!(report.rows_loaded, 3);
        assert!(!report.log_recorded);
        assert_eq!(store.row_count(&report.destination).await.unwrap(), 3);
        assert_eq!(store.appends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_load_reports_log_recorded() {
        let (loader, _) = loader();
        let report = loader.load(&sales(), "b", "sales.csv", "uploads").await.unwrap();
        assert!(report.log_recorded);
    }
}
