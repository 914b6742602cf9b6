use serde::{Deserialize, Serialize};

/// A byte blob written into object storage, identified by `(bucket, object_path)`.
///
/// Objects are not versioned: a second write with the same identity overwrites the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    pub object_path: String,
    pub size_bytes: u64,
    /// Public or backend-specific URL of the object.
    pub url: String,
}

impl StoredObject {
    /// `bucket/object_path`, as shown on the status page.
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.bucket, self.object_path)
    }
}
