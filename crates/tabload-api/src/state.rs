//! Application state shared by all handlers.

use std::sync::Arc;

use tabload_core::Config;
use tabload_processing::UploadValidator;
use tabload_storage::Storage;
use tabload_warehouse::TableLoader;

use crate::history::RecentActivity;

/// Everything a request needs. Built once at startup and never mutated afterwards, apart
/// from the recent-activity buffers.
pub struct AppState {
    pub config: Config,
    /// `None` when no `PROJECT_ID` is configured.
    pub storage: Option<Arc<dyn Storage>>,
    pub loader: TableLoader,
    pub validator: UploadValidator,
    pub history: RecentActivity,
}

impl AppState {
    pub fn new(config: Config, storage: Option<Arc<dyn Storage>>, loader: TableLoader) -> Self {
        let validator = UploadValidator::new(config.max_file_size_bytes());
        Self {
            config,
            storage,
            loader,
            validator,
            history: RecentActivity::new(),
        }
    }
}
