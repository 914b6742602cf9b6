//! Tabload API Library
//!
//! This crate provides the HTTP handlers (upload form, push notification hook, health and
//! ingestion history), the ingestion services behind them and application setup.

// Module declarations
mod handlers;
mod render;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod history;
pub mod notification;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use history::{RecentActivity, RecentUploadRecord};
pub use state::AppState;
