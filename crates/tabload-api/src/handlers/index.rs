//! Upload page: status view and form submission.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::Html,
};
use tabload_core::constants::RECENT_ACTIVITY_CAPACITY;
use tabload_core::AppError;

use crate::error::{display_message, log_error};
use crate::render::{render_page, StatusPage};
use crate::services::{process_upload, UploadOutcome};
use crate::state::AppState;
use crate::utils::upload::read_upload_form;

/// GET / - always 200.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_status(&state, None, None).await)
}

/// POST / - preview, upload or ingest. Errors are shown on the page, still with 200.
pub async fn submit(State(state): State<Arc<AppState>>, multipart: Multipart) -> Html<String> {
    let result = match read_upload_form(multipart).await {
        Ok(request) => process_upload(&state, request).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(outcome) => Html(render_status(&state, Some(&outcome), None).await),
        Err(err) => {
            log_error(&err);
            let message = display_message(&err, state.config.is_production());
            Html(render_status(&state, None, Some(&message)).await)
        }
    }
}

async fn render_status(
    state: &AppState,
    outcome: Option<&UploadOutcome>,
    error: Option<&str>,
) -> String {
    let default_dataset = state.config.default_dataset();
    let datasets = list_datasets(state).await;
    let recent_uploads = state.history.recent_uploads();
    let recent_ingests = recent_ingests(state).await;

    render_page(&StatusPage {
        buckets: state.config.buckets(),
        datasets: &datasets,
        default_dataset,
        table_store_enabled: state.loader.is_configured(),
        recent_uploads: &recent_uploads,
        recent_ingests: &recent_ingests,
        outcome,
        error,
    })
}

async fn list_datasets(state: &AppState) -> Vec<String> {
    let default = state.config.default_dataset().to_string();
    let Some(store) = state.loader.store() else {
        return vec![default];
    };

    match store.list_datasets().await {
        Ok(mut datasets) => {
            if !datasets.contains(&default) {
                datasets.insert(0, default);
            }
            datasets
        }
        Err(err) => {
            log_error(&AppError::from(err));
            vec![default]
        }
    }
}

/// Durable log when the table store is configured, the in-memory buffer otherwise.
async fn recent_ingests(state: &AppState) -> Vec<tabload_core::IngestionLogEntry> {
    let Some(store) = state.loader.store() else {
        return state.history.recent_ingests();
    };

    match store
        .recent_log(state.config.default_dataset(), RECENT_ACTIVITY_CAPACITY)
        .await
    {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "Falling back to in-memory ingest history");
            state.history.recent_ingests()
        }
    }
}
