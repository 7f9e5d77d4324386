//! Shared key handling for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that could escape a bucket.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid path segments: {}",
            key
        )));
    }
    Ok(())
}

/// Percent-encode each segment of a key, keeping `/` separators.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
