//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Default page bound for folder listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Signing failed: {0}")]
    SignFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Paging options for folder listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of entries returned
    pub limit: usize,
    /// Sort entries by name (ascending) before the limit is applied
    pub sort_by_name: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            limit: DEFAULT_LIST_LIMIT,
            sort_by_name: true,
        }
    }
}

impl ListOptions {
    pub fn with_limit(limit: usize) -> Self {
        ListOptions {
            limit,
            ..Default::default()
        }
    }
}

/// An entry of a folder listing. `name` is relative to the listed folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub name: String,
}

impl ObjectEntry {
    pub fn new(name: impl Into<String>) -> Self {
        ObjectEntry { name: name.into() }
    }
}

/// Object storage abstraction
///
/// Backends are shared between concurrent resolutions and must not keep
/// per-resolution state.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// List the direct entries of `folder` (empty string for the bucket root)
    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>>;

    /// Generate a time-limited signed URL granting read access to `key`
    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Build the permanent public URL of `key`. Performs no I/O.
    fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Apply `options` to an unordered, unbounded listing.
pub(crate) fn apply_list_options(
    mut entries: Vec<ObjectEntry>,
    options: ListOptions,
) -> Vec<ObjectEntry> {
    if options.sort_by_name {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }
    entries.truncate(options.limit);
    entries
}
