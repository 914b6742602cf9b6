//! Tabload Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration shared by
//! every tabload component: the tabular parser, object placement, the table loader and
//! the HTTP service.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, IngestConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    DestinationTable, FileKind, IngestStatus, IngestionLogEntry, ParsedTable, StoredObject,
    TablePreview, UploadedFile,
};
pub use storage_types::StorageBackend;
