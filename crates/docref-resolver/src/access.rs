//! Access URL acquisition: signed first, public as fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use docref_core::{Candidate, ResolvedAccess};
use docref_storage::ObjectStorage;

/// A URL obtained for an existing object, not yet checked for reachability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessUrl {
    Signed {
        url: String,
        signed_at: DateTime<Utc>,
    },
    Public(String),
}

impl AccessUrl {
    pub fn url(&self) -> &str {
        match self {
            AccessUrl::Signed { url, .. } | AccessUrl::Public(url) => url,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, AccessUrl::Signed { .. })
    }

    pub(crate) fn into_resolved(self, candidate: &Candidate, ttl: Duration) -> ResolvedAccess {
        match self {
            AccessUrl::Signed { url, signed_at } => {
                ResolvedAccess::signed(candidate, url, signed_at, ttl)
            }
            AccessUrl::Public(url) => ResolvedAccess::public(candidate, url),
        }
    }
}

#[derive(Clone)]
pub struct AccessUrlProvider {
    storage: Arc<dyn ObjectStorage>,
    ttl: Duration,
}

impl AccessUrlProvider {
    pub fn new(storage: Arc<dyn ObjectStorage>, ttl: Duration) -> Self {
        AccessUrlProvider { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signed URL if one can be issued, otherwise the public URL.
    pub async fn get_access_url(&self, bucket: &str, key: &str) -> Option<AccessUrl> {
        match self.signed_url(bucket, key).await {
            Some(signed) => Some(signed),
            None => self.public_url(bucket, key),
        }
    }

    pub async fn signed_url(&self, bucket: &str, key: &str) -> Option<AccessUrl> {
        let signed_at = Utc::now();
        match self.storage.create_signed_url(bucket, key, self.ttl).await {
            Ok(url) if !url.is_empty() => Some(AccessUrl::Signed { url, signed_at }),
            Ok(_) => {
                tracing::warn!(bucket = %bucket, key = %key, "Signed URL was empty");
                None
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Failed to create signed URL, falling back to public URL"
                );
                None
            }
        }
    }

    pub fn public_url(&self, bucket: &str, key: &str) -> Option<AccessUrl> {
        match self.storage.public_url(bucket, key) {
            Ok(url) if !url.is_empty() => Some(AccessUrl::Public(url)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Failed to build public URL"
                );
                None
            }
        }
    }
}
