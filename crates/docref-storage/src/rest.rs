use crate::keys::{encode_key, validate_key};
use crate::traits::{ListOptions, ObjectEntry, ObjectStorage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Storage client for an HTTP object API
///
/// Endpoints, relative to the base URL (e.g. `https://project.example/storage/v1`):
///
/// - `POST /object/list/{bucket}` lists a folder
/// - `POST /object/sign/{bucket}/{key}` issues a signed URL
/// - `GET /object/public/{bucket}/{key}` serves public objects
#[derive(Clone)]
pub struct RestStorage {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
    sort_by: Option<SortBy>,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Deserialize)]
struct ListEntry {
    name: String,
}

#[derive(Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: Option<String>,
}

impl RestStorage {
    /// Create a new RestStorage instance
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the object API
    /// * `api_key` - Optional key sent as bearer token and `apikey` header
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(RestStorage {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref key) => request.bearer_auth(key).header("apikey", key),
            None => request,
        }
    }

    /// Signed URLs come back relative to the base URL
    fn absolutize(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            signed.to_string()
        } else {
            format!("{}/{}", self.base_url, signed.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl ObjectStorage for RestStorage {
    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>> {
        let start = std::time::Instant::now();
        let url = format!("{}/object/list/{}", self.base_url, urlencoding::encode(bucket));
        let body = ListRequest {
            prefix: folder,
            limit: options.limit,
            offset: 0,
            sort_by: options.sort_by_name.then_some(SortBy {
                column: "name",
                order: "asc",
            }),
        };

        let response = self
            .authorized(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                bucket = %bucket,
                folder = %folder,
                status = %status,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object API list failed"
            );
            return Err(StorageError::ListFailed(format!(
                "list returned status {}",
                status
            )));
        }

        let entries: Vec<ListEntry> = response
            .json()
            .await
            .map_err(|e| StorageError::ListFailed(format!("invalid list response: {}", e)))?;

        tracing::debug!(
            bucket = %bucket,
            folder = %folder,
            entries = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object API list successful"
        );

        Ok(entries
            .into_iter()
            .map(|entry| ObjectEntry::new(entry.name))
            .collect())
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let url = format!(
            "{}/object/sign/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            encode_key(key)
        );

        let response = self
            .authorized(self.client.post(&url).json(&SignRequest {
                expires_in: expires_in.as_secs(),
            }))
            .send()
            .await
            .map_err(|e| StorageError::SignFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::SignFailed(format!(
                "sign returned status {}",
                status
            )));
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| StorageError::SignFailed(format!("invalid sign response: {}", e)))?;

        match body.signed_url.filter(|s| !s.is_empty()) {
            Some(signed) => Ok(self.absolutize(&signed)),
            None => Err(StorageError::SignFailed(
                "sign response did not contain a URL".to_string(),
            )),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!(
            "{}/object/public/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            encode_key(key)
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_list_posts_prefix_and_sort() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/object/list/documents")
            .match_header("apikey", "secret")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "prefix": "u1",
                "limit": 100,
                "sortBy": { "column": "name", "order": "asc" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name":"a.pdf","id":"1"},{"name":"f.pdf","id":"2"}]"#)
            .create_async()
            .await;

        let storage = RestStorage::new(server.url(), Some("secret".to_string())).unwrap();
        let entries = storage
            .list("documents", "u1", ListOptions::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            entries,
            vec![ObjectEntry::new("a.pdf"), ObjectEntry::new("f.pdf")]
        );
    }

    #[tokio::test]
    async fn test_list_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/object/list/documents")
            .with_status(403)
            .create_async()
            .await;

        let storage = RestStorage::new(server.url(), None).unwrap();
        let result = storage.list("documents", "", ListOptions::default()).await;
        assert!(matches!(result, Err(StorageError::ListFailed(_))));
    }

    #[tokio::test]
    async fn test_signed_url_is_made_absolute() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/object/sign/documents/u1/my%20file.pdf")
            .match_body(Matcher::Json(serde_json::json!({ "expiresIn": 3600 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"signedURL":"/object/sign/documents/u1/my%20file.pdf?token=abc"}"#)
            .create_async()
            .await;

        let storage = RestStorage::new(server.url(), None).unwrap();
        let url = storage
            .create_signed_url("documents", "u1/my file.pdf", Duration::from_secs(3600))
            .await
            .unwrap();

        assert_eq!(
            url,
            format!(
                "{}/object/sign/documents/u1/my%20file.pdf?token=abc",
                server.url()
            )
        );
    }

    #[tokio::test]
    async fn test_signed_url_missing_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/object/sign/documents/a.pdf")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"signedURL":null}"#)
            .create_async()
            .await;

        let storage = RestStorage::new(server.url(), None).unwrap();
        let result = storage
            .create_signed_url("documents", "a.pdf", Duration::from_secs(60))
            .await;
        assert!(matches!(result, Err(StorageError::SignFailed(_))));
    }

    #[test]
    fn test_public_url_encodes_segments() {
        let storage = RestStorage::new("https://storage.example/", None).unwrap();
        assert_eq!(
            storage.public_url("documents", "u1/my file.pdf").unwrap(),
            "https://storage.example/object/public/documents/u1/my%20file.pdf"
        );
        assert!(storage.public_url("documents", "../secret").is_err());
    }
}
