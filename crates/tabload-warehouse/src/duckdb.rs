//! DuckDB table store
//!
//! The connection starts in memory and attaches the project catalog, either a database file
//! (`WAREHOUSE_PATH`) or a private in-memory database. Datasets are schemas of that catalog.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use ::duckdb::{params, Connection};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use tabload_core::constants::INGESTION_LOG_TABLE;
use tabload_core::{DestinationTable, IngestStatus, IngestionLogEntry, ParsedTable};
use uuid::Uuid;

use crate::error::{WarehouseError, WarehouseResult};
use crate::naming::{is_reserved_table_name, quote_ident, quote_literal, validate_dataset_name};
use crate::traits::{LoadJob, TableStore};

const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Schemas every catalog has that are not datasets.
const SYSTEM_SCHEMAS: &[&str] = &["main", "information_schema", "pg_catalog"];

/// DuckDB-backed [`TableStore`]
pub struct DuckDbTableStore {
    project: String,
    /// Database file (None for in-memory)
    db_path: Option<PathBuf>,
    /// DuckDB connection (wrapped in Mutex for thread safety)
    connection: Arc<Mutex<Connection>>,
}

impl DuckDbTableStore {
    /// Open the store for `project`, persisted at `db_path` or kept in memory.
    pub fn open(project: impl Into<String>, db_path: Option<PathBuf>) -> WarehouseResult<Self> {
        let project = project.into();
        if project.trim().is_empty() {
            return Err(WarehouseError::Unconfigured("PROJECT_ID not set".to_string()));
        }

        let connection = Connection::open_in_memory().map_err(|e| {
            WarehouseError::Backend(format!("Failed to create DuckDB connection: {}", e))
        })?;

        let target = match &db_path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        };
        connection
            .execute_batch(&format!(
                "ATTACH {} AS {};",
                quote_literal(&target),
                quote_ident(&project)
            ))
            .map_err(|e| {
                WarehouseError::Backend(format!("Failed to attach catalog '{}': {}", target, e))
            })?;

        tracing::info!(
            project = %project,
            path = %target,
            "DuckDB table store opened"
        );

        Ok(Self {
            project,
            db_path,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// In-memory store, for tests and local demos.
    pub fn in_memory(project: impl Into<String>) -> WarehouseResult<Self> {
        Self::open(project, None)
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    fn qualified(&self, dataset: &str, table: &str) -> String {
        format!(
            "{}.{}.{}",
            quote_ident(&self.project),
            quote_ident(dataset),
            quote_ident(table)
        )
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_connection<T, F>(&self, f: F) -> WarehouseResult<T>
    where
        F: FnOnce(&Connection) -> WarehouseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let conn = connection
                .lock()
                .map_err(|e| WarehouseError::Backend(format!("Lock error: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| WarehouseError::Backend(format!("Blocking task failed: {}", e)))?
    }

    fn table_exists(
        conn: &Connection,
        project: &str,
        dataset: &str,
        table: &str,
    ) -> WarehouseResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_catalog = ? AND table_schema = ? AND table_name = ?",
            params![project, dataset, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// Serialize the table to CSV for `read_csv`; empty cells become empty fields (NULL).
fn stage_csv(data: &ParsedTable) -> WarehouseResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(data.column_names())
        .map_err(|e| WarehouseError::LoadFailed(format!("Failed to stage header: {}", e)))?;
    for row in data.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .map_err(|e| WarehouseError::LoadFailed(format!("Failed to stage row: {}", e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| WarehouseError::LoadFailed(format!("Failed to stage table: {}", e)))
}

type LogRow = (
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

fn entry_from_row(row: LogRow) -> WarehouseResult<IngestionLogEntry> {
    let (bucket, object_name, rows_loaded, status, timestamp) = row;
    let timestamp = timestamp.unwrap_or_default();
    let timestamp = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_READ_FORMAT)
        .map_err(|e| {
            WarehouseError::Backend(format!("Invalid log timestamp '{}': {}", timestamp, e))
        })?
        .and_utc();

    Ok(IngestionLogEntry {
        bucket: bucket.unwrap_or_default(),
        object_name: object_name.unwrap_or_default(),
        rows_loaded: rows_loaded.unwrap_or(0).max(0) as u64,
        status: IngestStatus::from(status.unwrap_or_default()),
        timestamp,
    })
}

#[async_trait]
impl TableStore for DuckDbTableStore {
    fn project(&self) -> &str {
        &self.project
    }

    async fn ensure_dataset(&self, dataset: &str) -> WarehouseResult<()> {
        validate_dataset_name(dataset)?;

        let sql = format!(
            "CREATE SCHEMA IF NOT EXISTS {schema};
             CREATE TABLE IF NOT EXISTS {log} (
                 bucket VARCHAR,
                 object_name VARCHAR,
                 rows_loaded BIGINT,
                 status VARCHAR,
                 \"timestamp\" TIMESTAMP
             );",
            schema = format!("{}.{}", quote_ident(&self.project), quote_ident(dataset)),
            log = self.qualified(dataset, INGESTION_LOG_TABLE),
        );

        self.with_connection(move |conn| {
            conn.execute_batch(&sql)?;
            Ok(())
        })
        .await?;

        tracing::debug!(project = %self.project, dataset = %dataset, "Dataset ensured");
        Ok(())
    }

    async fn list_datasets(&self) -> WarehouseResult<Vec<String>> {
        let project = self.project.clone();
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT schema_name FROM information_schema.schemata \
                 WHERE catalog_name = ? ORDER BY schema_name",
            )?;
            let names = stmt
                .query_map(params![project], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names
                .into_iter()
                .filter(|name| !SYSTEM_SCHEMAS.contains(&name.as_str()))
                .collect())
        })
        .await
    }

    async fn load_table(
        &self,
        destination: &DestinationTable,
        data: &ParsedTable,
    ) -> WarehouseResult<LoadJob> {
        if is_reserved_table_name(&destination.table) {
            return Err(WarehouseError::LoadFailed(format!(
                "table name '{}' is reserved",
                destination.table
            )));
        }
        let staged = stage_csv(data)?;
        let target = self.qualified(&destination.dataset, &destination.table);
        let job_id = Uuid::new_v4();
        let start = Instant::now();

        let rows_loaded = self
            .with_connection(move |conn| {
                let mut file = tempfile::Builder::new()
                    .prefix("tabload-load-")
                    .suffix(".csv")
                    .tempfile()?;
                file.write_all(&staged)?;
                file.flush()?;
                let path = file.path().display().to_string();

                let sql = format!(
                    "CREATE OR REPLACE TABLE {} AS \
                     SELECT * FROM read_csv({}, header = true, auto_detect = true)",
                    target,
                    quote_literal(&path)
                );
                conn.execute_batch(&sql)
                    .map_err(|e| WarehouseError::LoadFailed(e.to_string()))?;

                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {}", target), [], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await?;

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            job_id = %job_id,
            destination = %destination,
            rows_loaded = rows_loaded,
            duration_ms = duration_ms,
            "Load job completed"
        );

        Ok(LoadJob {
            job_id,
            destination: destination.clone(),
            rows_loaded,
            duration_ms,
        })
    }

    async fn append_log(&self, dataset: &str, entry: &IngestionLogEntry) -> WarehouseResult<()> {
        let sql = format!(
            "INSERT INTO {} (bucket, object_name, rows_loaded, status, \"timestamp\") \
             VALUES (?, ?, ?, ?, CAST(? AS TIMESTAMP))",
            self.qualified(dataset, INGESTION_LOG_TABLE)
        );
        let bucket = entry.bucket.clone();
        let object_name = entry.object_name.clone();
        let rows_loaded = entry.rows_loaded as i64;
        let status = entry.status.to_string();
        let timestamp = entry.timestamp.format(TIMESTAMP_WRITE_FORMAT).to_string();

        self.with_connection(move |conn| {
            conn.execute(
                &sql,
                params![bucket, object_name, rows_loaded, status, timestamp],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_log(
        &self,
        dataset: &str,
        limit: usize,
    ) -> WarehouseResult<Vec<IngestionLogEntry>> {
        validate_dataset_name(dataset)?;

        let project = self.project.clone();
        let dataset = dataset.to_string();
        let sql = format!(
            "SELECT bucket, object_name, rows_loaded, status, CAST(\"timestamp\" AS VARCHAR) \
             FROM {} ORDER BY \"timestamp\" DESC, rowid DESC LIMIT {}",
            self.qualified(&dataset, INGESTION_LOG_TABLE),
            limit
        );

        self.with_connection(move |conn| {
            if !Self::table_exists(conn, &project, &dataset, INGESTION_LOG_TABLE)? {
                return Ok(Vec::new());
            }

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], |row| -> Result<LogRow, ::duckdb::Error> {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter().map(entry_from_row).collect()
        })
        .await
    }

    async fn row_count(&self, destination: &DestinationTable) -> WarehouseResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}",
            self.qualified(&destination.dataset, &destination.table)
        );
        self.with_connection(move |conn| {
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn health_check(&self) -> WarehouseResult<()> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> ParsedTable {
        ParsedTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                        .collect()
                })
                .collect(),
        )
    }

    fn sales() -> ParsedTable {
        table(&["id", "amount"], &[&["1", "10"], &["2", "20"], &["3", "30"]])
    }

    #[tokio::test]
    async fn test_ensure_and_list_datasets() {
        let store = DuckDbTableStore::in_memory("acme-analytics").unwrap();
        assert!(store.list_datasets().await.unwrap().is_empty());

        store.ensure_dataset("uploads").await.unwrap();
        store.ensure_dataset("uploads").await.unwrap();
        store.ensure_dataset("archive").await.unwrap();

        assert_eq!(store.list_datasets().await.unwrap(), vec!["archive", "uploads"]);
    }

    #[tokio::test]
    async fn test_invalid_dataset_rejected() {
        let store = DuckDbTableStore::in_memory("p1").unwrap();
        let err = store.ensure_dataset("bad-name").await.unwrap_err();
        assert!(matches!(err, WarehouseError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_load_replaces_table_contents() {
        let store = DuckDbTableStore::in_memory("p1").unwrap();
        store.ensure_dataset("uploads").await.unwrap();
        let dest = DestinationTable::new("p1", "uploads", "sales");

        let job = store.load_table(&dest, &sales()).await.unwrap();
        assert_eq!(job.rows_loaded, 3);

        store.load_table(&dest, &sales()).await.unwrap();
        assert_eq!(store.row_count(&dest).await.unwrap(), 3);

        let smaller = table(&["id"], &[&["9"]]);
        store.load_table(&dest, &smaller).await.unwrap();
        assert_eq!(store.row_count(&dest).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_log_table_cannot_be_replaced() {
        let store = DuckDbTableStore::in_memory("p1").unwrap();
        store.ensure_dataset("uploads").await.unwrap();
        store
            .append_log("uploads", &IngestionLogEntry::success("b", "sales.csv", 3))
            .await
            .unwrap();

        let dest = DestinationTable::new("p1", "uploads", "ingestion_log");
        let err = store.load_table(&dest, &table(&["x"], &[&["1"]])).await.unwrap_err();
        assert!(matches!(err, WarehouseError::LoadFailed(_)));

        let log = store.recent_log("uploads", 10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].object_name, "sales.csv");
    }

    #[tokio::test]
    async fn test_load_handles_empty_cells_and_quotes() {
        let store = DuckDbTableStore::in_memory("p1").unwrap();
        store.ensure_dataset("uploads").await.unwrap();
        let dest = DestinationTable::new("p1", "uploads", "people");

        let data = table(
            &["name", "note"],
            &[&["Doe, Jane", ""], &["O'Brien", "said \"hi\""]],
        );
        let job = store.load_table(&dest, &data).await.unwrap();
        assert_eq!(job.rows_loaded, 2);
    }

    #[tokio::test]
    async fn test_log_append_and_read_newest_first() {
        let store = DuckDbTableStore::in_memory("p1").unwrap();
        store.ensure_dataset("uploads").await.unwrap();

        let mut first = IngestionLogEntry::success("b", "sales.csv", 3);
        first.timestamp = first.timestamp - chrono::Duration::seconds(5);
        let second = IngestionLogEntry::failure("b", "", "Missing event fields: name");

        store.append_log("uploads", &first).await.unwrap();
        store.append_log("uploads", &second).await.unwrap();

        let entries = store.recent_log("uploads", 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, second.status);
        assert_eq!(entries[0].rows_loaded, 0);
        assert_eq!(entries[1].object_name, "sales.csv");
        assert_eq!(entries[1].rows_loaded, 3);
        assert!(entries[1].status.is_ok());
        assert_eq!(entries[1].timestamp.timestamp(), first.timestamp.timestamp());

        assert_eq!(store.recent_log("uploads", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recent_log_of_unknown_dataset_is_empty() {
        let store = DuckDbTableStore::in_memory("p1").unwrap();
        assert!(store.recent_log("nothing_here", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warehouse.duckdb");
        {
            let store = DuckDbTableStore::open("p1", Some(path.clone())).unwrap();
            assert!(!store.is_in_memory());
            store.ensure_dataset("uploads").await.unwrap();
            store
                .load_table(&DestinationTable::new("p1", "uploads", "sales"), &sales())
                .await
                .unwrap();
        }

        let reopened = DuckDbTableStore::open("p1", Some(path)).unwrap();
        let count = reopened
            .row_count(&DestinationTable::new("p1", "uploads", "sales"))
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = DuckDbTableStore::in_memory("p1").unwrap();
        store.health_check().await.unwrap();
    }
}
