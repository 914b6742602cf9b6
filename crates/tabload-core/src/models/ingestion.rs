use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{STATUS_ERROR_PREFIX, STATUS_OK};

/// Destination of a load, addressed as `{project}.{dataset}.{table}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationTable {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl DestinationTable {
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }
}

impl Display for DestinationTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Outcome recorded for one ingestion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum IngestStatus {
    Ok,
    /// Error description, without the `ERROR: ` prefix.
    Error(String),
}

impl IngestStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, IngestStatus::Ok)
    }
}

impl Display for IngestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            IngestStatus::Ok => write!(f, "{}", STATUS_OK),
            IngestStatus::Error(message) => write!(f, "{}{}", STATUS_ERROR_PREFIX, message),
        }
    }
}

impl From<String> for IngestStatus {
    fn from(value: String) -> Self {
        if value == STATUS_OK {
            IngestStatus::Ok
        } else {
            let message = value
                .strip_prefix(STATUS_ERROR_PREFIX)
                .map(str::to_string)
                .unwrap_or(value);
            IngestStatus::Error(message)
        }
    }
}

impl From<IngestStatus> for String {
    fn from(value: IngestStatus) -> Self {
        value.to_string()
    }
}

/// One row of the append-only `ingestion_log` table.
///
/// The same shape is kept in memory as the recent-ingest record shown on the status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionLogEntry {
    pub bucket: String,
    pub object_name: String,
    pub rows_loaded: u64,
    pub status: IngestStatus,
    pub timestamp: DateTime<Utc>,
}

impl IngestionLogEntry {
    pub fn success(bucket: &str, object_name: &str, rows_loaded: u64) -> Self {
        Self {
            bucket: bucket.to_string(),
            object_name: object_name.to_string(),
            rows_loaded,
            status: IngestStatus::Ok,
            timestamp: Utc::now(),
        }
    }

    /// Failed attempts always record zero rows.
    pub fn failure(bucket: &str, object_name: &str, message: impl Into<String>) -> Self {
        Self {
            bucket: bucket.to_string(),
            object_name: object_name.to_string(),
            rows_loaded: 0,
            status: IngestStatus::Error(message.into()),
            timestamp: Utc::now(),
        }
    }
}
