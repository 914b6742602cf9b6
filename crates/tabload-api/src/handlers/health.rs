//! Health check handlers and response types.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const UNCONFIGURED: &str = "unconfigured";

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub warehouse: String,
}

/// Liveness check: the process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Health of the object store and the table store. Unconfigured backends are not failures.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = match (&state.storage, state.config.buckets().first()) {
        (None, _) => UNCONFIGURED.to_string(),
        (Some(_), None) => "configured".to_string(),
        (Some(storage), Some(bucket)) => {
            run_check(
                CHECK_TIMEOUT,
                async move { storage.exists(bucket, "health-check-non-existent-key").await.map(drop) },
                "unhealthy",
            )
            .await
        }
    };

    let warehouse = match state.loader.store() {
        None => UNCONFIGURED.to_string(),
        Some(store) => run_check(CHECK_TIMEOUT, store.health_check(), "unhealthy").await,
    };

    let healthy = |s: &str| s == "healthy" || s == "configured" || s == UNCONFIGURED;
    let overall = healthy(storage.as_str()) && healthy(warehouse.as_str());
    if !overall {
        tracing::warn!(storage = %storage, warehouse = %warehouse, "Health check failed");
    }

    let response = HealthCheckResponse {
        status: if overall { "healthy" } else { "unhealthy" }.to_string(),
        storage,
        warehouse,
    };
    let status_code = if overall {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
