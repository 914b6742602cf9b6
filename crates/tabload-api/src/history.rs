//! Process-local recent activity for the status page.
//!
//! Best effort only: entries are lost on restart and never replace the durable
//! `ingestion_log`.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tabload_core::constants::RECENT_ACTIVITY_CAPACITY;
use tabload_core::IngestionLogEntry;
use tabload_storage::PlacementOutcome;
use uuid::Uuid;

/// One upload from the form, with its per-bucket outcomes.
#[derive(Debug, Clone)]
pub struct RecentUploadRecord {
    pub id: Uuid,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub placements: Vec<PlacementOutcome>,
    pub timestamp: DateTime<Utc>,
}

impl RecentUploadRecord {
    pub fn new(filename: &str, rows: usize, columns: usize, placements: Vec<PlacementOutcome>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            rows,
            columns,
            placements,
            timestamp: Utc::now(),
        }
    }
}

/// Newest-first bounded buffer.
#[derive(Debug)]
struct Ring<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T: Clone> Ring<T> {
    fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        // A panic while holding the lock cannot leave the deque inconsistent
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, item: T) {
        let mut items = self.lock();
        items.push_front(item);
        items.truncate(self.capacity);
    }

    fn snapshot(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }
}

/// Recent uploads and recent ingests, capacity 10 each.
#[derive(Debug)]
pub struct RecentActivity {
    uploads: Ring<RecentUploadRecord>,
    ingests: Ring<IngestionLogEntry>,
}

impl Default for RecentActivity {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentActivity {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_ACTIVITY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uploads: Ring::new(capacity),
            ingests: Ring::new(capacity),
        }
    }

    pub fn record_upload(&self, record: RecentUploadRecord) {
        self.uploads.push(record);
    }

    pub fn record_ingest(&self, entry: IngestionLogEntry) {
        self.ingests.push(entry);
    }

    /// Newest first
    pub fn recent_uploads(&self) -> Vec<RecentUploadRecord> {
        self.uploads.snapshot()
    }

    /// Newest first
    pub fn recent_ingests(&self) -> Vec<IngestionLogEntry> {
        self.ingests.snapshot()
    }
}
