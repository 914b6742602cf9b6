//! Tabload Warehouse Library
//!
//! Loads parsed tables into the analytical table store and keeps the append-only
//! `ingestion_log` audit table. The store is DuckDB: the project is an attached catalog and each
//! dataset is a schema inside it.

pub mod duckdb;
pub mod error;
pub mod factory;
pub mod loader;
pub mod naming;
pub mod traits;

pub use self::duckdb::DuckDbTableStore;
pub use error::{WarehouseError, WarehouseResult};
pub use factory::create_table_store;
pub use loader::{LoadReport, TableLoader};
pub use naming::{sanitize_table_name, validate_dataset_name};
pub use traits::{LoadJob, TableStore};
