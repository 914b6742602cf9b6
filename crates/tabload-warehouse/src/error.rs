use tabload_core::AppError;
use thiserror::Error;

/// Result type for table store operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Table store errors
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// No client, project or dataset to load into.
    #[error("{0}")]
    Unconfigured(String),

    /// The store rejected the data.
    #[error("{0}")]
    LoadFailed(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("table store error: {0}")]
    Backend(String),
}

impl From<::duckdb::Error> for WarehouseError {
    fn from(err: ::duckdb::Error) -> Self {
        WarehouseError::Backend(err.to_string())
    }
}

impl From<std::io::Error> for WarehouseError {
    fn from(err: std::io::Error) -> Self {
        WarehouseError::Backend(format!("staging file: {}", err))
    }
}

impl From<WarehouseError> for AppError {
    fn from(err: WarehouseError) -> Self {
        match err {
            WarehouseError::Unconfigured(msg) => AppError::TableStoreUnconfigured(msg),
            WarehouseError::LoadFailed(msg) => AppError::LoadJobFailed(msg),
            WarehouseError::InvalidName(_) => AppError::InvalidInput(err.to_string()),
            WarehouseError::Backend(msg) => AppError::Internal(msg),
        }
    }
}
