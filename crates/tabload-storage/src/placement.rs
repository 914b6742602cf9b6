//! Multi-bucket placement of one uploaded file.

use bytes::Bytes;
use tabload_core::StoredObject;

use crate::keys::{object_path, validate_bucket_name};
use crate::traits::Storage;

/// Result of writing the file to one target bucket.
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    pub bucket: String,
    /// Empty when the path itself could not be built.
    pub object_path: String,
    pub result: Result<StoredObject, String>,
}

impl PlacementOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Write `data` to every bucket in order, one attempt each.
///
/// A failing bucket does not stop the remaining ones; the returned list has one outcome per
/// requested bucket, in the same order.
pub async fn place_in_buckets(
    storage: &dyn Storage,
    buckets: &[String],
    folder: &str,
    filename: &str,
    content_type: &str,
    data: Bytes,
) -> Vec<PlacementOutcome> {
    let path = match object_path(folder, filename) {
        Ok(path) => path,
        Err(e) => {
            let message = e.to_string();
            return buckets
                .iter()
                .map(|bucket| PlacementOutcome {
                    bucket: bucket.clone(),
                    object_path: String::new(),
                    result: Err(message.clone()),
                })
                .collect();
        }
    };

    let mut outcomes = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let result = match validate_bucket_name(bucket) {
            Ok(()) => storage
                .upload(bucket, &path, content_type, data.clone())
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        if let Err(ref error) = result {
            tracing::warn!(
                bucket = %bucket,
                object_path = %path,
                error = %error,
                "Placement into bucket failed, continuing with remaining buckets"
            );
        }

        outcomes.push(PlacementOutcome {
            bucket: bucket.clone(),
            object_path: path.clone(),
            result,
        });
    }

    outcomes
}
