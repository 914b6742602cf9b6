//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in process: the object store is in-memory and the table store is an
//! in-memory DuckDB catalog, so no external services are needed.

#![allow(dead_code)]

pub mod fixtures;
pub mod stub_store;

use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::Arc;
use tabload_api::setup::routes;
use tabload_api::state::AppState;
use tabload_core::{Config, IngestConfig};
use tabload_storage::{ObjectStoreStorage, Storage};
use tabload_warehouse::{DuckDbTableStore, TableLoader, TableStore};

pub const TEST_PROJECT: &str = "test-project";
pub const TEST_DATASET: &str = "uploads";
pub const TEST_BUCKETS: &str = "raw-uploads,staging";

/// Test application: server plus handles on the backends behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Option<Arc<dyn Storage>>,
    pub store: Option<Arc<dyn TableStore>>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        self.storage.as_ref().expect("storage configured")
    }

    pub fn store(&self) -> &Arc<dyn TableStore> {
        self.store.as_ref().expect("table store configured")
    }
}

pub fn test_config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let ingest = IngestConfig::from_lookup(|key| vars.get(key).cloned()).expect("valid config");
    Config(Box::new(ingest))
}

/// Fully configured app: in-memory buckets and table store, default dataset created.
pub async fn setup_test_app() -> TestApp {
    let store: Arc<dyn TableStore> =
        Arc::new(DuckDbTableStore::in_memory(TEST_PROJECT).expect("open duckdb"));
    setup_test_app_with_store(store).await
}

/// Fully configured app over the given table store.
pub async fn setup_test_app_with_store(store: Arc<dyn TableStore>) -> TestApp {
    let config = test_config(&[
        ("PROJECT_ID", TEST_PROJECT),
        ("BQ_DATASET", TEST_DATASET),
        ("GCS_BUCKETS", TEST_BUCKETS),
        ("STORAGE_BACKEND", "memory"),
    ]);

    let storage: Arc<dyn Storage> = Arc::new(ObjectStoreStorage::in_memory());
    store
        .ensure_dataset(TEST_DATASET)
        .await
        .expect("create default dataset");

    build(config, Some(storage), Some(store))
}

/// App without `PROJECT_ID`: previews work, storage and loading do not.
pub fn setup_unconfigured_app() -> TestApp {
    build(test_config(&[]), None, None)
}

fn build(
    config: Config,
    storage: Option<Arc<dyn Storage>>,
    store: Option<Arc<dyn TableStore>>,
) -> TestApp {
    let state = Arc::new(AppState::new(
        config.clone(),
        storage.clone(),
        TableLoader::new(store.clone()),
    ));
    let router = routes::setup_routes(&config, state.clone());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        storage,
        store,
    }
}
