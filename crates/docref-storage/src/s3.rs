use crate::keys::{encode_key, validate_key};
use crate::traits::{
    apply_list_options, ListOptions, ObjectEntry, ObjectStorage, StorageError, StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{ObjectStore, Result as ObjectResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// S3 storage implementation
///
/// One `AmazonS3` client is built per bucket on first use and cached.
pub struct S3Storage {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    stores: RwLock<HashMap<String, Arc<AmazonS3>>>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(region: String, endpoint_url: Option<String>) -> Self {
        S3Storage {
            region,
            endpoint_url,
            stores: RwLock::new(HashMap::new()),
        }
    }

    fn store_for(&self, bucket: &str) -> StorageResult<Arc<AmazonS3>> {
        if let Some(store) = self
            .stores
            .read()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?
            .get(bucket)
        {
            return Ok(Arc::clone(store));
        }

        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        self.stores
            .write()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?
            .insert(bucket.to_string(), Arc::clone(&store));

        Ok(store)
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, bucket: &str, key: &str) -> String {
        let key = encode_key(key);
        if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key)
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>> {
        let store = self.store_for(bucket)?;
        let start = std::time::Instant::now();
        let prefix = (!folder.is_empty()).then(|| Path::from(folder));

        let result: ObjectResult<_> = store.list_with_delimiter(prefix.as_ref()).await;

        let listing = result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                folder = %folder,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 list failed"
            );
            StorageError::ListFailed(e.to_string())
        })?;

        let entries = listing
            .objects
            .iter()
            .filter_map(|meta| meta.location.filename())
            .map(ObjectEntry::new)
            .collect();

        tracing::debug!(
            bucket = %bucket,
            folder = %folder,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(apply_list_options(entries, options))
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let store = self.store_for(bucket)?;
        let location = Path::from(key);
        let url_result: ObjectResult<_> = store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::SignFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        Ok(self.generate_url(bucket, key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
