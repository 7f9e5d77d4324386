//! Reference resolution orchestrator.
//!
//! Candidates are tried strictly in normalizer order. For each: existence probe,
//! then access URL, then reachability. A candidate failing any step is skipped;
//! only the final outcome is reported to the caller.

use std::sync::Arc;
use std::time::Duration;

use docref_core::{CancelCause, Candidate, Config, ResolveError, ResolveResult, ResolvedAccess};
use docref_storage::ObjectStorage;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::access::AccessUrlProvider;
use crate::normalizer::PathNormalizer;
use crate::probe::ExistenceProbe;
use crate::reachability::{HttpReachability, ReachabilityCheck};
use crate::url_pattern::StorageUrlPattern;

const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);
const LIST_PAGE_LIMIT: usize = 100;
const HEAD_TIMEOUT: Duration = Duration::from_secs(5);
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub url_pattern: StorageUrlPattern,
    /// Buckets besides the default that bare paths may start with
    pub known_buckets: Vec<String>,
    pub signed_url_ttl: Duration,
    pub list_page_limit: usize,
    pub head_timeout: Duration,
    /// Overall budget for one resolution; `None` disables it
    pub resolve_timeout: Option<Duration>,
    /// Probe all candidates concurrently before walking them in order
    pub parallel_probes: bool,
    /// HEAD-check external URLs instead of passing them through
    pub verify_external_urls: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            url_pattern: StorageUrlPattern::new(),
            known_buckets: Vec::new(),
            signed_url_ttl: SIGNED_URL_TTL,
            list_page_limit: LIST_PAGE_LIMIT,
            head_timeout: HEAD_TIMEOUT,
            resolve_timeout: Some(RESOLVE_TIMEOUT),
            parallel_probes: false,
            verify_external_urls: false,
        }
    }
}

impl ResolverOptions {
    pub fn from_config(config: &Config) -> Self {
        let mut url_pattern = StorageUrlPattern::new();
        if let Some(base) = config.storage_url.as_deref().and_then(|u| Url::parse(u).ok()) {
            url_pattern = url_pattern.with_object_api_base(base);
        }
        if let Some(endpoint) = config.s3_endpoint.as_deref().and_then(|u| Url::parse(u).ok()) {
            url_pattern = url_pattern.with_s3_endpoint(endpoint);
        }

        ResolverOptions {
            url_pattern,
            known_buckets: config.known_buckets.clone(),
            signed_url_ttl: config.signed_url_ttl(),
            list_page_limit: config.list_page_limit,
            head_timeout: config.head_timeout(),
            resolve_timeout: (config.resolve_timeout_ms > 0).then(|| config.resolve_timeout()),
            parallel_probes: config.parallel_probes,
            verify_external_urls: config.verify_external_urls,
        }
    }
}

/// Furthest step any candidate reached; decides the failure reported on exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Progress {
    NothingFound,
    ObjectFound,
    UrlIssued,
}

impl Progress {
    fn into_error(self, raw: &str) -> ResolveError {
        let reference = raw.to_string();
        match self {
            Progress::NothingFound => ResolveError::NoMatchingObject { reference },
            Progress::ObjectFound => ResolveError::AccessUnavailable { reference },
            Progress::UrlIssued => ResolveError::Unreachable { reference },
        }
    }
}

/// Resolves stored references to verified access URLs.
///
/// Holds no per-call state; one instance can serve concurrent resolutions.
#[derive(Clone)]
pub struct ReferenceResolver {
    normalizer: PathNormalizer,
    probe: ExistenceProbe,
    access: AccessUrlProvider,
    verifier: Arc<dyn ReachabilityCheck>,
    resolve_timeout: Option<Duration>,
    parallel_probes: bool,
    verify_external_urls: bool,
}

impl ReferenceResolver {
    pub fn new(storage: Arc<dyn ObjectStorage>, options: ResolverOptions) -> Self {
        let verifier = Arc::new(HttpReachability::new(options.head_timeout));
        ReferenceResolver {
            normalizer: PathNormalizer::new(options.url_pattern)
                .with_known_buckets(options.known_buckets),
            probe: ExistenceProbe::new(storage.clone(), options.list_page_limit),
            access: AccessUrlProvider::new(storage, options.signed_url_ttl),
            verifier,
            resolve_timeout: options.resolve_timeout,
            parallel_probes: options.parallel_probes,
            verify_external_urls: options.verify_external_urls,
        }
    }

    /// Replace the HTTP reachability check.
    pub fn with_verifier(mut self, verifier: Arc<dyn ReachabilityCheck>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Candidates that `resolve` would try for `raw`, in order.
    pub fn candidates(&self, raw: &str, default_bucket: &str) -> Vec<Candidate> {
        self.normalizer.normalize(raw, default_bucket)
    }

    /// Resolve `raw` to a verified, reachable URL.
    pub async fn resolve(&self, raw: &str, default_bucket: &str) -> ResolveResult<ResolvedAccess> {
        self.resolve_with_cancel(raw, default_bucket, &CancellationToken::new())
            .await
    }

    /// Like [`resolve`](Self::resolve), abandoning in-flight work when `cancel`
    /// fires or the overall budget elapses.
    #[tracing::instrument(skip(self, cancel), fields(operation = "resolve_reference"))]
    pub async fn resolve_with_cancel(
        &self,
        raw: &str,
        default_bucket: &str,
        cancel: &CancellationToken,
    ) -> ResolveResult<ResolvedAccess> {
        let start = std::time::Instant::now();

        let bounded = async {
            match self.resolve_timeout {
                Some(budget) => tokio::time::timeout(budget, self.run(raw, default_bucket))
                    .await
                    .unwrap_or(Err(ResolveError::Cancelled(CancelCause::DeadlineExceeded))),
                None => self.run(raw, default_bucket).await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ResolveError::Cancelled(CancelCause::Caller)),
            result = bounded => result,
        };

        match result {
            Ok(ref access) => tracing::info!(
                bucket = %access.bucket,
                key = %access.key,
                kind = ?access.kind,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Reference resolved"
            ),
            Err(ref e) => tracing::warn!(
                error = %e,
                reference = %raw,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Reference resolution failed"
            ),
        }

        result
    }

    async fn run(&self, raw: &str, default_bucket: &str) -> ResolveResult<ResolvedAccess> {
        let candidates = self.normalizer.normalize(raw, default_bucket);

        let Some(first) = candidates.first() else {
            return Err(ResolveError::NormalizationEmpty);
        };
        if first.is_external() {
            return self.pass_through(&first.key).await;
        }

        tracing::debug!(candidates = candidates.len(), "Trying candidates");

        let probed = if self.parallel_probes {
            Some(join_all(candidates.iter().map(|c| self.probe_candidate(c))).await)
        } else {
            None
        };

        let mut progress = Progress::NothingFound;
        for (idx, candidate) in candidates.iter().enumerate() {
            let exists = match probed {
                Some(ref results) => results[idx],
                None => self.probe_candidate(candidate).await,
            };
            if !exists {
                continue;
            }
            progress = progress.max(Progress::ObjectFound);

            let Some(access) = self
                .access
                .get_access_url(&candidate.bucket, &candidate.key)
                .await
            else {
                continue;
            };
            progress = progress.max(Progress::UrlIssued);

            if self.verifier.verify(access.url()).await {
                return Ok(access.into_resolved(candidate, self.access.ttl()));
            }

            // A rejected signature does not rule out a public bucket
            if access.is_signed() {
                if let Some(public) = self.access.public_url(&candidate.bucket, &candidate.key) {
                    if self.verifier.verify(public.url()).await {
                        return Ok(public.into_resolved(candidate, self.access.ttl()));
                    }
                }
            }

            tracing::debug!(
                bucket = %candidate.bucket,
                key = %candidate.key,
                "Candidate exists but is unreachable, trying next"
            );
        }

        Err(progress.into_error(raw))
    }

    async fn pass_through(&self, url: &str) -> ResolveResult<ResolvedAccess> {
        if self.verify_external_urls && !self.verifier.verify(url).await {
            return Err(ResolveError::Unreachable {
                reference: url.to_string(),
            });
        }
        Ok(ResolvedAccess::external(url))
    }

    async fn probe_candidate(&self, candidate: &Candidate) -> bool {
        match self.probe.exists(&candidate.bucket, &candidate.key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %candidate.bucket,
                    key = %candidate.key,
                    "Existence probe failed, treating candidate as missing"
                );
                false
            }
        }
    }
}
