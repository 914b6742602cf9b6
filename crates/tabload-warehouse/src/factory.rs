use std::path::PathBuf;
use std::sync::Arc;

use tabload_core::Config;

use crate::duckdb::DuckDbTableStore;
use crate::error::WarehouseResult;
use crate::traits::TableStore;

/// Create the table store from configuration.
///
/// Returns `Ok(None)` when `PROJECT_ID` is not set; loads then fail with `Unconfigured`.
pub fn create_table_store(config: &Config) -> WarehouseResult<Option<Arc<dyn TableStore>>> {
    let Some(project) = config.project_id() else {
        return Ok(None);
    };

    let path = config.warehouse_path().map(PathBuf::from);
    let store = DuckDbTableStore::open(project, path)?;
    Ok(Some(Arc::new(store)))
}
