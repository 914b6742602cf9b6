//! Direct upload from the form: preview, place into buckets, optionally load.

use std::str::FromStr;

use tabload_core::constants::DIRECT_UPLOAD_SOURCE;
use tabload_core::{AppError, TablePreview, UploadedFile};
use tabload_processing::parse_upload;
use tabload_storage::{place_in_buckets, PlacementOutcome};
use tabload_warehouse::{validate_dataset_name, LoadReport};

use crate::history::RecentUploadRecord;
use crate::services::ingest::load_parsed;
use crate::state::AppState;

/// What to do with an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadAction {
    #[default]
    Preview,
    Upload,
    Ingest,
}

impl FromStr for UploadAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "preview" => Ok(UploadAction::Preview),
            "upload" => Ok(UploadAction::Upload),
            "ingest" => Ok(UploadAction::Ingest),
            other => Err(AppError::InvalidInput(format!("Unknown action '{}'", other))),
        }
    }
}

/// A submitted upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,
    pub folder: String,
    pub dataset: Option<String>,
    pub new_dataset: Option<String>,
    pub buckets: Vec<String>,
    pub action: UploadAction,
}

/// Result shown back on the page.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub filename: String,
    pub preview: TablePreview,
    pub placements: Vec<PlacementOutcome>,
    pub load: Option<LoadReport>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Dataset for this request only: a new dataset wins over a selected one, which wins over the
/// configured default.
fn request_dataset(state: &AppState, request: &UploadRequest) -> String {
    non_blank(request.new_dataset.as_deref())
        .or_else(|| non_blank(request.dataset.as_deref()))
        .unwrap_or_else(|| state.config.default_dataset())
        .to_string()
}

pub async fn process_upload(
    state: &AppState,
    request: UploadRequest,
) -> Result<UploadOutcome, AppError> {
    let file = request
        .file
        .clone()
        .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    state.validator.validate_file_size(file.size())?;
    let table = parse_upload(&file)?;
    let preview = table.preview();

    tracing::info!(
        filename = %file.filename,
        action = ?request.action,
        rows = preview.row_count,
        columns = preview.column_count,
        "Upload parsed"
    );

    if request.action == UploadAction::Preview {
        return Ok(UploadOutcome {
            filename: file.filename,
            preview,
            placements: Vec::new(),
            load: None,
        });
    }

    let dataset = request_dataset(state, &request);
    if let Some(new_dataset) = non_blank(request.new_dataset.as_deref()) {
        create_dataset(state, new_dataset).await?;
    }

    let buckets: Vec<String> = if request.buckets.is_empty() {
        state.config.buckets().to_vec()
    } else {
        request.buckets.clone()
    };

    let placements = match (&state.storage, request.action) {
        (Some(storage), _) if !buckets.is_empty() => {
            let content_type = file.content_type().unwrap_or("application/octet-stream");
            place_in_buckets(
                storage.as_ref(),
                &buckets,
                &request.folder,
                &file.filename,
                content_type,
                file.content.clone(),
            )
            .await
        }
        (Some(_), UploadAction::Upload) => {
            return Err(AppError::InvalidInput("No buckets selected".to_string()));
        }
        (None, UploadAction::Upload) => {
            return Err(AppError::StorageUnavailable(
                "object storage not configured (PROJECT_ID not set)".to_string(),
            ));
        }
        _ => Vec::new(),
    };

    if !placements.is_empty() {
        state.history.record_upload(RecentUploadRecord::new(
            &file.filename,
            preview.row_count,
            preview.column_count,
            placements.clone(),
        ));
    }

    let load = if request.action == UploadAction::Ingest {
        let (bucket, object_name) = placements
            .iter()
            .find_map(|p| p.result.as_ref().ok())
            .map(|stored| (stored.bucket.clone(), stored.object_path.clone()))
            .unwrap_or_else(|| (DIRECT_UPLOAD_SOURCE.to_string(), file.filename.clone()));

        Some(load_parsed(state, &table, &bucket, &object_name, &dataset).await?)
    } else {
        None
    };

    Ok(UploadOutcome {
        filename: file.filename,
        preview,
        placements,
        load,
    })
}

async fn create_dataset(state: &AppState, dataset: &str) -> Result<(), AppError> {
    validate_dataset_name(dataset)?;
    let store = state.loader.store().ok_or_else(|| {
        AppError::TableStoreUnconfigured("cannot create dataset without PROJECT_ID".to_string())
    })?;
    store.ensure_dataset(dataset).await?;
    tracing::info!(dataset = %dataset, "Dataset created for this request");
    Ok(())
}
