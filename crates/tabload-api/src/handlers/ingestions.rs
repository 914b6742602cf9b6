//! Ingestion history API.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tabload_core::{AppError, IngestionLogEntry};
use tabload_warehouse::validate_dataset_name;

use crate::error::HttpAppError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct IngestionsQuery {
    pub dataset: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct IngestionsResponse {
    pub dataset: String,
    /// "table_store" or "memory"
    pub source: &'static str,
    pub entries: Vec<IngestionLogEntry>,
}

/// GET /api/ingestions?dataset=&limit= - newest first.
pub async fn list_ingestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IngestionsQuery>,
) -> Result<Json<IngestionsResponse>, HttpAppError> {
    let dataset = query
        .dataset
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| state.config.default_dataset())
        .to_string();
    validate_dataset_name(&dataset)?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        ))
        .into());
    }

    let response = match state.loader.store() {
        Some(store) => IngestionsResponse {
            entries: store.recent_log(&dataset, limit).await?,
            dataset,
            source: "table_store",
        },
        None => IngestionsResponse {
            entries: state
                .history
                .recent_ingests()
                .into_iter()
                .take(limit)
                .collect(),
            dataset,
            source: "memory",
        },
    };

    Ok(Json(response))
}
