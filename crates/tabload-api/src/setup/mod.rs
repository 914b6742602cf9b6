//! Application setup and initialization
//!
//! Order matters: configuration is validated before anything is opened, telemetry comes up
//! before the first backend logs, and routes are built last over the finished state.

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;
pub mod warehouse;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tabload_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let storage = storage::setup_storage(&config).await?;
    let loader = warehouse::setup_warehouse(&config).await?;

    let state = Arc::new(AppState::new(config.clone(), storage, loader));

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
