//! Recognition of URLs that point at the object storage service.
//!
//! Three shapes are understood:
//!
//! - object API: `{base}/object/{public|sign|authenticated}/{bucket}/{key}`
//! - S3 on AWS: `https://{bucket}.s3.{region}.amazonaws.com/{key}` and the
//!   path-style `https://s3.{region}.amazonaws.com/{bucket}/{key}`
//! - S3-compatible endpoint, path-style: `{endpoint}/{bucket}/{key}`
//!
//! `s3://{bucket}/{key}` URIs are accepted as well. Query strings and fragments
//! (stale signature tokens, mostly) are ignored.
//!
//! `Url` only decides whether a URL points at storage. Bucket and key are
//! sliced from the string as written, since `Url` re-encodes the path and
//! resolves dot segments.

use docref_core::Candidate;
use percent_encoding::percent_decode_str;
use url::Url;

const OBJECT_SEGMENT: &str = "object";
const ACCESS_MODES: [&str; 3] = ["public", "sign", "authenticated"];

#[derive(Debug, Clone, Default)]
pub struct StorageUrlPattern {
    object_api_base: Option<Url>,
    s3_endpoint: Option<Url>,
}

impl StorageUrlPattern {
    /// Pattern matching object API URLs on any host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict object API matches to URLs under `base`.
    pub fn with_object_api_base(mut self, base: Url) -> Self {
        self.object_api_base = Some(base);
        self
    }

    /// Recognise path-style URLs under an S3-compatible endpoint.
    pub fn with_s3_endpoint(mut self, endpoint: Url) -> Self {
        self.s3_endpoint = Some(endpoint);
        self
    }

    /// Extract `(bucket, key)` from `raw`, already parsed as `url`, or `None` if
    /// it does not point at the storage service. The key is the literal text
    /// of `raw`.
    pub fn parse(&self, url: &Url, raw: &str) -> Option<Candidate> {
        let path = raw_path(raw);
        if url.scheme() == "s3" {
            return candidate(url.host_str()?, path);
        }

        self.parse_object_api(url, path)
            .or_else(|| self.parse_s3_endpoint(url, path))
            .or_else(|| parse_aws(url, path))
    }

    fn parse_object_api(&self, url: &Url, path: &str) -> Option<Candidate> {
        let rest = match self.object_api_base {
            Some(ref base) => {
                if !same_origin(url, base) {
                    return None;
                }
                strip_path_prefix(path, base.path())?
            }
            None => {
                // Any host: locate the `object/{mode}/` marker in the path
                let mut offset = 0;
                loop {
                    let candidate = &path[offset..];
                    if starts_with_object_marker(candidate) {
                        break candidate;
                    }
                    offset += candidate.find('/')? + 1;
                }
            }
        };

        let rest = rest.strip_prefix(OBJECT_SEGMENT)?.strip_prefix('/')?;
        let (mode, rest) = rest.split_once('/')?;
        if !ACCESS_MODES.contains(&mode) {
            return None;
        }
        let (bucket, key) = rest.split_once('/')?;
        candidate(bucket, key)
    }

    fn parse_s3_endpoint(&self, url: &Url, path: &str) -> Option<Candidate> {
        let endpoint = self.s3_endpoint.as_ref()?;
        if !same_origin(url, endpoint) {
            return None;
        }
        let rest = strip_path_prefix(path, endpoint.path())?;
        let (bucket, key) = rest.split_once('/')?;
        candidate(bucket, key)
    }
}

fn parse_aws(url: &Url, path: &str) -> Option<Candidate> {
    let host = url.host_str()?;
    let service = host.strip_suffix(".amazonaws.com")?;

    // Path-style: s3.{region}.amazonaws.com/{bucket}/{key}
    if service == "s3" || service.starts_with("s3.") || service.starts_with("s3-") {
        let (bucket, key) = path.split_once('/')?;
        return candidate(bucket, key);
    }

    // Virtual-hosted: {bucket}.s3[.-]{region}.amazonaws.com/{key}
    let marker = service
        .find(".s3.")
        .or_else(|| service.find(".s3-"))
        .or_else(|| service.strip_suffix(".s3").map(|b| b.len()))?;
    candidate(&service[..marker], path)
}

/// Path of `raw` as written, without leading slashes, query or fragment.
fn raw_path(raw: &str) -> &str {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let end = rest.find(|c| c == '?' || c == '#').unwrap_or(rest.len());
    let rest = &rest[..end];
    match rest.find('/') {
        Some(idx) => rest[idx..].trim_start_matches('/'),
        None => "",
    }
}

fn starts_with_object_marker(path: &str) -> bool {
    let Some(rest) = path
        .strip_prefix(OBJECT_SEGMENT)
        .and_then(|r| r.strip_prefix('/'))
    else {
        return false;
    };
    ACCESS_MODES
        .iter()
        .any(|mode| rest.strip_prefix(mode).is_some_and(|r| r.starts_with('/')))
}

fn same_origin(url: &Url, base: &Url) -> bool {
    url.scheme() == base.scheme()
        && url.host_str() == base.host_str()
        && url.port_or_known_default() == base.port_or_known_default()
}

/// Strip the base path (with or without slashes) from a path without its leading slash.
fn strip_path_prefix<'a>(path: &'a str, base_path: &str) -> Option<&'a str> {
    let base = base_path.trim_matches('/');
    if base.is_empty() {
        return Some(path);
    }
    path.strip_prefix(base)?.strip_prefix('/')
}

fn candidate(bucket: &str, key: &str) -> Option<Candidate> {
    let bucket = percent_decode_str(bucket).decode_utf8().ok()?;
    if bucket.is_empty() || key.is_empty() {
        return None;
    }
    Some(Candidate::new(bucket.into_owned(), key))
}
