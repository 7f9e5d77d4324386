use crate::keys::{encode_key, validate_key};
use crate::traits::{
    apply_list_options, ListOptions, ObjectEntry, ObjectStorage, StorageError, StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Local filesystem storage implementation
///
/// Objects live at `{base_path}/{bucket}/{key}` and are served from
/// `{base_url}/{bucket}/{key}`. Signing is not supported.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one sub-directory per bucket
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert bucket and folder to a filesystem path with traversal validation
    fn folder_path(&self, bucket: &str, folder: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty() || bucket.contains('/') || bucket == ".." {
            return Err(StorageError::InvalidKey(format!(
                "Invalid bucket name: {}",
                bucket
            )));
        }
        validate_key(folder)?;

        let bucket_path = self.base_path.join(bucket);
        let path = if folder.is_empty() {
            bucket_path.clone()
        } else {
            bucket_path.join(folder)
        };

        if let (Ok(canonical), Ok(base_canonical)) =
            (path.canonicalize(), self.base_path.canonicalize())
        {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>> {
        let path = self.folder_path(bucket, folder)?;
        let start = std::time::Instant::now();

        let mut dir = match fs::read_dir(&path).await {
            Ok(dir) => dir,
            // A missing folder simply has no entries
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ListFailed(format!(
                    "Failed to read directory {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                entries.push(ObjectEntry::new(name));
            }
        }

        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage list successful"
        );

        Ok(apply_list_options(entries, options))
    }

    async fn create_signed_url(
        &self,
        _bucket: &str,
        _key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::Unsupported(
            "Local storage does not issue signed URLs".to_string(),
        ))
    }

    fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            bucket,
            encode_key(key)
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
