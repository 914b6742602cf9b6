//! Error types module
//!
//! All failures of the ingestion pipeline are unified under [`AppError`]. Crate-local errors
//! (parser, storage, warehouse) convert into it so the request-handler boundary can turn any
//! of them into a short human-readable message. None of these errors is fatal to the process.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like unsupported uploads
    Debug,
    /// Warning level - for bad notifications and rejected data
    Warn,
    /// Error level - for unexpected failures of backing services
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "LOAD_JOB_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (redelivery may succeed)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Malformed table data: {0}")]
    MalformedTableData(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Table store not configured: {0}")]
    TableStoreUnconfigured(String),

    #[error("Load job failed: {0}")]
    LoadJobFailed(String),

    #[error("Missing envelope data: {0}")]
    MissingEnvelopeData(String),

    #[error("Missing event fields: {0}")]
    MissingEventFields(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::UnsupportedFileType(_) => (
            400,
            "UNSUPPORTED_FILE_TYPE",
            false,
            Some("Upload a .csv, .xls or .xlsx file"),
            false,
            LogLevel::Debug,
        ),
        AppError::MalformedTableData(_) => (
            400,
            "MALFORMED_TABLE_DATA",
            false,
            Some("Check that the file is a well-formed table with a header row"),
            false,
            LogLevel::Debug,
        ),
        AppError::StorageUnavailable(_) => (
            503,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Check the object store configuration and retry"),
            true,
            LogLevel::Error,
        ),
        AppError::ObjectNotFound(_) => (
            404,
            "OBJECT_NOT_FOUND",
            false,
            Some("Verify the bucket and object name exist"),
            false,
            LogLevel::Warn,
        ),
        AppError::TableStoreUnconfigured(_) => (
            503,
            "TABLE_STORE_UNCONFIGURED",
            false,
            Some("Set PROJECT_ID and BQ_DATASET"),
            false,
            LogLevel::Error,
        ),
        AppError::LoadJobFailed(_) => (
            422,
            "LOAD_JOB_FAILED",
            false,
            Some("Check that every column holds values of a consistent type"),
            false,
            LogLevel::Warn,
        ),
        AppError::MissingEnvelopeData(_) => (
            400,
            "MISSING_ENVELOPE_DATA",
            false,
            Some("Send a push envelope with message.data set"),
            false,
            LogLevel::Warn,
        ),
        AppError::MissingEventFields(_) => (
            400,
            "MISSING_EVENT_FIELDS",
            false,
            Some("The storage event must carry bucket and name"),
            false,
            LogLevel::Warn,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::UnsupportedFileType(_) => "UnsupportedFileType",
            AppError::MalformedTableData(_) => "MalformedTableData",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
            AppError::ObjectNotFound(_) => "ObjectNotFound",
            AppError::TableStoreUnconfigured(_) => "TableStoreUnconfigured",
            AppError::LoadJobFailed(_) => "LoadJobFailed",
            AppError::MissingEnvelopeData(_) => "MissingEnvelopeData",
            AppError::MissingEventFields(_) => "MissingEventFields",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }

    /// Status string written to the ingestion log for this failure.
    pub fn log_status(&self) -> String {
        format!("{}{}", crate::constants::STATUS_ERROR_PREFIX, self)
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::StorageUnavailable(_) => "Object storage is unavailable".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}
