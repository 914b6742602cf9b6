//! Domain models shared by the ingestion pipeline.

mod ingestion;
mod storage;
mod table;

pub use ingestion::{DestinationTable, IngestStatus, IngestionLogEntry};
pub use storage::StoredObject;
pub use table::{FileKind, ParsedTable, TablePreview, UploadedFile};
