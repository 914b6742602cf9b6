//! Fixed values shared across crates.

/// Number of rows kept in a table preview.
pub const PREVIEW_ROWS: usize = 5;

/// Capacity of the in-memory recent upload / ingest buffers.
pub const RECENT_ACTIVITY_CAPACITY: usize = 10;

/// Name of the append-only audit table inside every dataset.
pub const INGESTION_LOG_TABLE: &str = "ingestion_log";

/// Status recorded for a successful ingestion.
pub const STATUS_OK: &str = "OK";

/// Prefix of the status recorded for a failed ingestion.
pub const STATUS_ERROR_PREFIX: &str = "ERROR: ";

/// Filename used when a multipart upload carries none.
pub const DEFAULT_UPLOAD_FILENAME: &str = "unknown";

/// Bucket recorded in the ingestion log for loads that did not go through object storage.
pub const DIRECT_UPLOAD_SOURCE: &str = "direct-upload";
