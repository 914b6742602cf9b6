//! Ingestion services shared by the form handler and the notification hook.

pub mod ingest;
pub mod upload;

pub use ingest::{handle_notification, load_parsed};
pub use upload::{process_upload, UploadAction, UploadOutcome, UploadRequest};
