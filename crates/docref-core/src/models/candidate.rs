use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel bucket name for references that point outside the storage service.
pub const EXTERNAL_BUCKET: &str = "external";

/// One hypothesized `(bucket, key)` interpretation of a stored reference.
///
/// For external pass-through candidates the bucket is [`EXTERNAL_BUCKET`] and
/// the key holds the raw URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub bucket: String,
    pub key: String,
}

impl Candidate {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Candidate {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn external(url: impl Into<String>) -> Self {
        Candidate::new(EXTERNAL_BUCKET, url)
    }

    pub fn is_external(&self) -> bool {
        self.bucket == EXTERNAL_BUCKET
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
