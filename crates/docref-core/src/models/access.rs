use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::candidate::{Candidate, EXTERNAL_BUCKET};

/// How the URL in a [`ResolvedAccess`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    /// Time-limited signed URL for a private object
    Signed,
    /// Permanent public URL
    Public,
    /// External URL passed through unverified against storage
    External,
}

/// A verified, currently reachable URL for a stored reference.
///
/// Callers may cache it until `expires_at`; `None` means the URL does not expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAccess {
    pub bucket: String,
    pub key: String,
    pub url: String,
    pub kind: AccessKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ResolvedAccess {
    /// Signed URL issued at `signed_at`, valid for `ttl` from then.
    pub fn signed(
        candidate: &Candidate,
        url: String,
        signed_at: DateTime<Utc>,
        ttl: std::time::Duration,
    ) -> Self {
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        ResolvedAccess {
            bucket: candidate.bucket.clone(),
            key: candidate.key.clone(),
            url,
            kind: AccessKind::Signed,
            expires_at: signed_at.checked_add_signed(ttl),
        }
    }

    pub fn public(candidate: &Candidate, url: String) -> Self {
        ResolvedAccess {
            bucket: candidate.bucket.clone(),
            key: candidate.key.clone(),
            url,
            kind: AccessKind::Public,
            expires_at: None,
        }
    }

    pub fn external(url: &str) -> Self {
        ResolvedAccess {
            bucket: EXTERNAL_BUCKET.to_string(),
            key: url.to_string(),
            url: url.to_string(),
            kind: AccessKind::External,
            expires_at: None,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_access_expires_after_ttl() {
        let candidate = Candidate::new("documents", "u1/f.pdf");
        let signed_at = Utc::now();
        let access = ResolvedAccess::signed(
            &candidate,
            "https://storage.example/sign".to_string(),
            signed_at,
            std::time::Duration::from_secs(3600),
        );
        assert_eq!(access.kind, AccessKind::Signed);
        assert_eq!(access.expires_at, Some(signed_at + Duration::hours(1)));
        assert!(!access.is_permanent());
        assert!(!access.is_expired_at(Utc::now()));
        assert!(access.is_expired_at(Utc::now() + Duration::hours(2)));
    }

    #[test]
    fn test_external_access_is_permanent() {
        let access = ResolvedAccess::external("https://cdn.other.org/a.pdf");
        assert_eq!(access.bucket, EXTERNAL_BUCKET);
        assert_eq!(access.url, "https://cdn.other.org/a.pdf");
        assert!(access.is_permanent());
    }

    #[test]
    fn test_serialize_omits_missing_expiry() {
        let access = ResolvedAccess::public(
            &Candidate::new("documents", "a.pdf"),
            "https://storage.example/object/public/documents/a.pdf".to_string(),
        );
        let json = serde_json::to_value(&access).unwrap();
        assert_eq!(json["kind"], "public");
        assert!(json.get("expires_at").is_none());
    }
}
