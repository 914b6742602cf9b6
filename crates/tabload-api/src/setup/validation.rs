//! Configuration validation
//!
//! Checks configuration at startup. Hard errors abort, anything merely odd is logged.

use anyhow::Result;
use tabload_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if let Some(table) = config.legacy_table() {
        tracing::warn!(
            table = %table,
            "BQ_TABLE is ignored; table names are derived from the uploaded file name"
        );
    }

    if config.project_id().is_none() {
        tracing::warn!(
            "PROJECT_ID not set - uploads can be previewed but not stored or loaded"
        );
    }

    if config.buckets().is_empty() {
        tracing::warn!("GCS_BUCKETS is empty - the upload form has no buckets to offer");
    }

    for bucket in config.buckets() {
        if let Err(e) = tabload_storage::validate_bucket_name(bucket) {
            tracing::warn!(bucket = %bucket, error = %e, "Configured bucket name looks invalid");
        }
    }

    Ok(())
}
