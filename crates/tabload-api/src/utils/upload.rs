//! Multipart form extraction for the upload page.

use axum::extract::Multipart;
use tabload_core::constants::DEFAULT_UPLOAD_FILENAME;
use tabload_core::{AppError, UploadedFile};

use crate::services::{UploadAction, UploadRequest};

/// Read the upload form. Only one field named "file" is accepted; `buckets` may repeat and
/// each value may hold a comma-separated list. Unknown fields are ignored.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if request.file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field
                    .file_name()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_UPLOAD_FILENAME)
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;

                // Browsers send an empty part when no file was chosen
                if !(data.is_empty() && filename == DEFAULT_UPLOAD_FILENAME) {
                    request.file = Some(UploadedFile::new(filename, data));
                }
            }
            "folder" => request.folder = read_text(field).await?,
            "dataset" => request.dataset = Some(read_text(field).await?),
            "new_dataset" => request.new_dataset = Some(read_text(field).await?),
            "buckets" => {
                let value = read_text(field).await?;
                request.buckets.extend(split_buckets(&value));
            }
            "action" => request.action = read_text(field).await?.parse::<UploadAction>()?,
            _ => {}
        }
    }

    Ok(request)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read form field: {}", e)))
}

/// Split a comma-separated bucket list, dropping blanks.
pub fn split_buckets(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
