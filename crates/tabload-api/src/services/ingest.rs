//! Notification-triggered ingestion and the load/record step shared with direct uploads.

use std::time::Instant;

use tabload_core::{AppError, IngestionLogEntry, ParsedTable};
use tabload_processing::parse_table;
use tabload_warehouse::{LoadReport, WarehouseError};

use crate::notification::PushEnvelope;
use crate::state::AppState;

/// Process one push notification: decode, fetch, parse, load into the configured dataset.
///
/// Every attempt is recorded. Failures are recorded with zero rows in memory and, when the
/// table store is configured, in the durable log.
pub async fn handle_notification(state: &AppState, body: &[u8]) -> Result<LoadReport, AppError> {
    let start = Instant::now();
    let dataset = state.config.default_dataset();
    let envelope = PushEnvelope::parse_lenient(body);

    let event = match envelope.decode_event() {
        Ok(event) => event,
        Err((err, partial)) => {
            record_failure(state, dataset, &partial.bucket, &partial.name, &err).await;
            return Err(err);
        }
    };

    tracing::info!(
        message_id = envelope.message_id().unwrap_or("-"),
        bucket = %event.bucket,
        object_name = %event.name,
        content_type = event.content_type.as_deref().unwrap_or("-"),
        size = %event.size_display(),
        "Storage notification received"
    );

    let table = match fetch_and_parse(state, &event.bucket, &event.name).await {
        Ok(table) => table,
        Err(err) => {
            record_failure(state, dataset, &event.bucket, &event.name, &err).await;
            return Err(err);
        }
    };

    let report = load_parsed(state, &table, &event.bucket, &event.name, dataset).await?;

    tracing::info!(
        bucket = %event.bucket,
        object_name = %event.name,
        destination = %report.destination,
        rows_loaded = report.rows_loaded,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Notification ingestion completed"
    );

    Ok(report)
}

async fn fetch_and_parse(
    state: &AppState,
    bucket: &str,
    object_name: &str,
) -> Result<ParsedTable, AppError> {
    let storage = state.storage.as_ref().ok_or_else(|| {
        AppError::StorageUnavailable("object storage not configured (PROJECT_ID not set)".into())
    })?;

    let bytes = storage.download(bucket, object_name).await?;
    Ok(parse_table(&bytes, object_name)?)
}

/// Load `table` and record the attempt in the recent-ingest buffer.
///
/// Rejected loads are already in the durable log (the loader writes them); other failures are
/// appended here. A replaced table whose log row could not be written still counts as loaded.
pub async fn load_parsed(
    state: &AppState,
    table: &ParsedTable,
    bucket: &str,
    object_name: &str,
    dataset: &str,
) -> Result<LoadReport, AppError> {
    match state.loader.load(table, bucket, object_name, dataset).await {
        Ok(report) => {
            if !report.log_recorded {
                tracing::warn!(
                    destination = %report.destination,
                    rows_loaded = report.rows_loaded,
                    "Load completed without a durable log entry"
                );
            }
            state.history.record_ingest(IngestionLogEntry::success(
                bucket,
                object_name,
                report.rows_loaded,
            ));
            Ok(report)
        }
        Err(WarehouseError::LoadFailed(message)) => {
            let err = AppError::LoadJobFailed(message);
            state
                .history
                .record_ingest(IngestionLogEntry::failure(bucket, object_name, err.to_string()));
            Err(err)
        }
        Err(other) => {
            let err: AppError = other.into();
            record_failure(state, dataset, bucket, object_name, &err).await;
            Err(err)
        }
    }
}

async fn record_failure(
    state: &AppState,
    dataset: &str,
    bucket: &str,
    object_name: &str,
    err: &AppError,
) {
    let entry = IngestionLogEntry::failure(bucket, object_name, err.to_string());
    state.history.record_ingest(entry.clone());

    if let Err(log_err) = state.loader.record_failure(dataset, &entry).await {
        tracing::warn!(
            error = %log_err,
            bucket = %bucket,
            object_name = %object_name,
            "Failed to append failure to ingestion log"
        );
    }
}
