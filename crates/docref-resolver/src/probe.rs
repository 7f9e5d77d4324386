//! Listing-based existence checks.
//!
//! The storage API offers no cheap single-object stat, so existence is decided
//! by listing the parent folder. Only the first page (sorted by name) is
//! inspected: objects past the page bound in very large folders are reported
//! as missing.

use std::sync::Arc;

use docref_storage::{ListOptions, ObjectStorage, StorageResult};

#[derive(Clone)]
pub struct ExistenceProbe {
    storage: Arc<dyn ObjectStorage>,
    options: ListOptions,
}

impl ExistenceProbe {
    pub fn new(storage: Arc<dyn ObjectStorage>, page_limit: usize) -> Self {
        ExistenceProbe {
            storage,
            options: ListOptions::with_limit(page_limit),
        }
    }

    /// Whether an object named exactly `key` exists in `bucket`.
    ///
    /// A missing object is `Ok(false)`; `Err` is reserved for transport and
    /// authorization failures of the listing itself.
    pub async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        let (folder, file_name) = split_key(key);
        if file_name.is_empty() {
            return Ok(false);
        }

        let start = std::time::Instant::now();
        let entries = self.storage.list(bucket, folder, self.options).await?;
        let found = entries.iter().any(|entry| entry.name == file_name);

        tracing::debug!(
            bucket = %bucket,
            key = %key,
            found,
            listed = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Existence probe finished"
        );

        Ok(found)
    }
}

/// Split a key into `(folder, file_name)` at the last `/`.
pub fn split_key(key: &str) -> (&str, &str) {
    match key.rfind('/') {
        Some(idx) => (&key[..idx], &key[idx + 1..]),
        None => ("", key),
    }
}
