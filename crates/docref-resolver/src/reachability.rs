//! HTTP reachability checks for candidate URLs.

use async_trait::async_trait;
use reqwest::header::RANGE;
use reqwest::StatusCode;
use std::time::Duration;

/// Decides whether a URL is currently servable.
///
/// Implementations never fail: every error counts as unreachable.
#[async_trait]
pub trait ReachabilityCheck: Send + Sync {
    async fn verify(&self, url: &str) -> bool;
}

/// HEAD-based reachability check with a per-request timeout.
///
/// URLs presigned for `GET` reject a `HEAD` with 403 (the method is part of
/// the signature), and some servers answer 405. Those statuses are re-checked
/// with a one-byte ranged `GET`.
#[derive(Clone)]
pub struct HttpReachability {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpReachability {
    pub fn new(timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), timeout)
    }

    /// Use a shared client (connection pool) for the checks.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        HttpReachability { client, timeout }
    }

    async fn send(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
        check: &str,
    ) -> Option<StatusCode> {
        let start = std::time::Instant::now();
        match request.timeout(self.timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    tracing::debug!(
                        url = %url,
                        check = %check,
                        status = %status,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Reachability check returned non-success status"
                    );
                }
                Some(status)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    url = %url,
                    check = %check,
                    timed_out = e.is_timeout(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Reachability check failed"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ReachabilityCheck for HttpReachability {
    async fn verify(&self, url: &str) -> bool {
        let Some(status) = self.send(url, self.client.head(url), "head").await else {
            return false;
        };
        if status.is_success() {
            return true;
        }
        if status != StatusCode::FORBIDDEN && status != StatusCode::METHOD_NOT_ALLOWED {
            return false;
        }

        let ranged = self.client.get(url).header(RANGE, "bytes=0-0");
        self.send(url, ranged, "ranged_get")
            .await
            .is_some_and(|status| status.is_success())
    }
}
