//! Configuration module
//!
//! Storage connection settings and resolution tuning, read from the environment.
//! The resolver itself never reads the environment; host code builds options
//! from this configuration and passes the default bucket explicitly.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const DEFAULT_BUCKET: &str = "documents";
const SIGNED_URL_TTL_SECS: u64 = 3600;
const LIST_PAGE_LIMIT: usize = 100;
const HEAD_TIMEOUT_MS: u64 = 5000;
const RESOLVE_TIMEOUT_MS: u64 = 8000;

#[derive(Clone, Debug)]
pub struct Config {
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub storage_url: Option<String>,
    pub storage_api_key: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Resolution configuration
    pub default_bucket: String,
    pub known_buckets: Vec<String>,
    pub signed_url_ttl_secs: u64,
    pub list_page_limit: usize,
    pub head_timeout_ms: u64,
    pub resolve_timeout_ms: u64,
    pub parallel_probes: bool,
    pub verify_external_urls: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = match var("STORAGE_BACKEND") {
            Some(s) => s.parse()?,
            None => StorageBackend::Rest,
        };

        let config = Config {
            storage_backend,
            storage_url: var("STORAGE_URL"),
            storage_api_key: var("STORAGE_API_KEY"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            default_bucket: var("DEFAULT_BUCKET")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            known_buckets: var("KNOWN_BUCKETS")
                .map(|s| {
                    s.split(',')
                        .map(|b| b.trim().to_string())
                        .filter(|b| !b.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            signed_url_ttl_secs: var("SIGNED_URL_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SIGNED_URL_TTL_SECS),
            list_page_limit: var("LIST_PAGE_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(LIST_PAGE_LIMIT),
            head_timeout_ms: var("HEAD_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(HEAD_TIMEOUT_MS),
            resolve_timeout_ms: var("RESOLVE_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(RESOLVE_TIMEOUT_MS),
            parallel_probes: var("PARALLEL_PROBES")
                .map(|s| s.to_lowercase().parse().unwrap_or(false))
                .unwrap_or(false),
            verify_external_urls: var("VERIFY_EXTERNAL_URLS")
                .map(|s| s.to_lowercase().parse().unwrap_or(false))
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.default_bucket.is_empty() || self.default_bucket.contains('/') {
            return Err(anyhow::anyhow!(
                "DEFAULT_BUCKET must be a non-empty bucket name without '/'"
            ));
        }

        if self.list_page_limit == 0 {
            return Err(anyhow::anyhow!("LIST_PAGE_LIMIT must be greater than 0"));
        }

        match self.storage_backend {
            StorageBackend::Rest => {
                let Some(ref url) = self.storage_url else {
                    return Err(anyhow::anyhow!(
                        "STORAGE_URL must be set when using the rest storage backend"
                    ));
                };
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(anyhow::anyhow!(
                        "STORAGE_URL must start with http:// or https://"
                    ));
                }
            }
            StorageBackend::S3 => {
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    pub fn head_timeout(&self) -> Duration {
        Duration::from_millis(self.head_timeout_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}
