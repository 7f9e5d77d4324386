//! Candidate generation for stored references.
//!
//! Turns a raw stored reference into an ordered, deduplicated list of
//! `(bucket, key)` candidates, most likely first. Pure: no I/O happens here.

use std::borrow::Cow;
use std::collections::HashSet;

use docref_core::Candidate;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::url_pattern::StorageUrlPattern;

#[derive(Debug, Clone, Default)]
pub struct PathNormalizer {
    pattern: StorageUrlPattern,
    known_buckets: Vec<String>,
}

/// Insertion-ordered candidate set; the first occurrence wins.
#[derive(Default)]
struct CandidateList {
    seen: HashSet<Candidate>,
    items: Vec<Candidate>,
}

impl CandidateList {
    fn push(&mut self, candidate: Candidate) {
        if self.seen.insert(candidate.clone()) {
            self.items.push(candidate);
        }
    }

    /// Push every base candidate, then the spelling variants of each.
    fn extend_with_variants(&mut self, bases: &[Candidate]) {
        for base in bases {
            self.push(base.clone());
        }
        for base in bases {
            for key in key_variants(&base.key) {
                self.push(Candidate::new(base.bucket.as_str(), key));
            }
        }
    }

    fn into_vec(self) -> Vec<Candidate> {
        self.items
    }
}

impl PathNormalizer {
    pub fn new(pattern: StorageUrlPattern) -> Self {
        PathNormalizer {
            pattern,
            known_buckets: Vec::new(),
        }
    }

    /// Buckets other than the default that bare paths may be prefixed with.
    pub fn with_known_buckets(mut self, buckets: Vec<String>) -> Self {
        self.known_buckets = buckets;
        self
    }

    /// Produce the ordered candidate list for `raw`.
    ///
    /// Returns an empty list only when `raw` holds nothing usable. An absolute
    /// URL that does not point at storage yields a single external candidate.
    pub fn normalize(&self, raw: &str, default_bucket: &str) -> Vec<Candidate> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut list = CandidateList::default();

        if let Some(url) = parse_absolute_url(trimmed) {
            match self.pattern.parse(&url, trimmed) {
                Some(candidate) => list.extend_with_variants(&[candidate]),
                None => list.push(Candidate::external(trimmed)),
            }
            return list.into_vec();
        }

        // Trailing whitespace can be part of a stored key
        let relative = raw.trim_start_matches('/');
        if relative.trim().is_empty() {
            return Vec::new();
        }

        let mut bases = Vec::with_capacity(2);
        // A key that repeats the bucket name is most likely a bucket-prefixed path
        if let Some(stripped) = strip_bucket_prefix(relative, default_bucket) {
            bases.push(Candidate::new(default_bucket, stripped));
        }
        bases.push(Candidate::new(default_bucket, relative));
        for bucket in &self.known_buckets {
            if bucket == default_bucket {
                continue;
            }
            if let Some(stripped) = strip_bucket_prefix(relative, bucket) {
                bases.push(Candidate::new(bucket.as_str(), stripped));
            }
        }

        list.extend_with_variants(&bases);
        list.into_vec()
    }
}

/// Absolute URLs are http(s) or anything with an authority (`s3://bucket/...`).
fn parse_absolute_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    let is_web = matches!(url.scheme(), "http" | "https");
    (is_web || url.has_host()).then_some(url)
}

fn strip_bucket_prefix<'a>(path: &'a str, bucket: &str) -> Option<&'a str> {
    let stripped = path
        .strip_prefix(bucket)?
        .strip_prefix('/')?
        .trim_start_matches('/');
    (!stripped.is_empty()).then_some(stripped)
}

/// Alternative spellings of a key, in priority order.
///
/// `+` is treated as an encoded space before percent-decoding, so `%2B`
/// still decodes to a literal plus.
fn key_variants(key: &str) -> Vec<String> {
    let plus_as_space = key.replace('+', " ");
    let mut spellings = vec![key.to_string()];
    if let Some(decoded) = percent_decode(key) {
        spellings.push(decoded);
    }
    spellings.push(plus_as_space.clone());
    if let Some(decoded) = percent_decode(&plus_as_space) {
        spellings.push(decoded);
    }

    let collapsed: Vec<String> = spellings
        .iter()
        .map(|s| collapse_slashes(s).into_owned())
        .collect();
    spellings.extend(collapsed);
    spellings
}

fn percent_decode(key: &str) -> Option<String> {
    percent_decode_str(key)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

fn collapse_slashes(key: &str) -> Cow<'_, str> {
    if !key.contains("//") {
        return Cow::Borrowed(key);
    }
    let mut collapsed = String::with_capacity(key.len());
    let mut previous_slash = false;
    for c in key.chars() {
        if c == '/' && previous_slash {
            continue;
        }
        previous_slash = c == '/';
        collapsed.push(c);
    }
    Cow::Owned(collapsed)
}
