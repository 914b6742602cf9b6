//! Shared object path rules for storage backends.
//!
//! Path format: `{folder}/{filename}` where the folder prefix is empty or ends with `/`.

use crate::traits::{StorageError, StorageResult};

/// Normalize a user-supplied folder prefix.
///
/// Surrounding whitespace and leading slashes are removed and a trailing `/` is added to any
/// non-empty result. A prefix containing `..` is rejected.
pub fn normalize_folder(folder: &str) -> StorageResult<String> {
    let trimmed = folder.trim().trim_start_matches('/');
    if trimmed.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "folder '{}' must not contain '..'",
            folder
        )));
    }
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}/", trimmed))
    }
}

/// Build the object path for `filename` under `folder`.
pub fn object_path(folder: &str, filename: &str) -> StorageResult<String> {
    let path = format!("{}{}", normalize_folder(folder)?, filename);
    validate_object_path(&path)?;
    Ok(path)
}

/// Object paths must be non-empty, relative and free of `..`.
pub fn validate_object_path(path: &str) -> StorageResult<()> {
    if path.is_empty() || path.ends_with('/') {
        return Err(StorageError::InvalidKey(
            "object path must name a file".to_string(),
        ));
    }
    if path.contains("..") || path.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "object path '{}' contains invalid characters",
            path
        )));
    }
    Ok(())
}

/// Structural check only: a bucket is a single non-empty path segment without `..`,
/// whitespace or control characters. Provider naming rules are left to the provider.
pub fn validate_bucket_name(bucket: &str) -> StorageResult<()> {
    let malformed = bucket.is_empty()
        || bucket.contains('/')
        || bucket.contains("..")
        || bucket.chars().any(|c| c.is_whitespace() || c.is_control());

    if malformed {
        return Err(StorageError::InvalidBucket(bucket.to_string()));
    }
    Ok(())
}
