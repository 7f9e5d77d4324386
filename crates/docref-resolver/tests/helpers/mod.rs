//! Test helpers: in-memory storage and reachability fakes.
//!
//! Run from workspace root: `cargo test -p docref-resolver`.

#![allow(dead_code)]

use async_trait::async_trait;
use docref_resolver::ReachabilityCheck;
use docref_storage::{
    ListOptions, ObjectEntry, ObjectStorage, StorageBackend, StorageError, StorageResult,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const STORAGE_BASE: &str = "https://storage.example";

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docref=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// In-memory object storage with call accounting.
#[derive(Default)]
pub struct FakeStorage {
    objects: HashMap<String, BTreeSet<String>>,
    /// Buckets whose signing requests fail
    unsignable: HashSet<String>,
    /// Buckets without a public URL
    private: HashSet<String>,
    /// Folders whose listing fails with a transport error
    broken_folders: HashSet<String>,
    list_delay: Option<Duration>,
    folder_delays: HashMap<String, Duration>,
    pub lists: Mutex<Vec<(String, String)>>,
    pub sign_calls: AtomicUsize,
    pub public_calls: AtomicUsize,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str) -> Self {
        self.objects
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string());
        self
    }

    pub fn unsignable(mut self, bucket: &str) -> Self {
        self.unsignable.insert(bucket.to_string());
        self
    }

    pub fn private(mut self, bucket: &str) -> Self {
        self.private.insert(bucket.to_string());
        self
    }

    pub fn broken_folder(mut self, folder: &str) -> Self {
        self.broken_folders.insert(folder.to_string());
        self
    }

    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Delay listings of `folder`, overriding the global list delay.
    pub fn with_folder_delay(mut self, folder: &str, delay: Duration) -> Self {
        self.folder_delays.insert(folder.to_string(), delay);
        self
    }

    pub fn list_count(&self) -> usize {
        self.lists.lock().unwrap().len()
    }

    pub fn access_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst) + self.public_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn list(
        &self,
        bucket: &str,
        folder: &str,
        options: ListOptions,
    ) -> StorageResult<Vec<ObjectEntry>> {
        self.lists
            .lock()
            .unwrap()
            .push((bucket.to_string(), folder.to_string()));
        if let Some(delay) = self.folder_delays.get(folder).copied().or(self.list_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.broken_folders.contains(folder) {
            return Err(StorageError::ListFailed("connection reset".to_string()));
        }

        let prefix = if folder.is_empty() {
            String::new()
        } else {
            format!("{}/", folder)
        };
        let mut entries: Vec<ObjectEntry> = self
            .objects
            .get(bucket)
            .into_iter()
            .flatten()
            .filter_map(|key| key.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.contains('/'))
            .map(ObjectEntry::new)
            .collect();
        if options.sort_by_name {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
        entries.truncate(options.limit);
        Ok(entries)
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let n = self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.unsignable.contains(bucket) {
            return Err(StorageError::SignFailed("bucket is not signable".to_string()));
        }
        Ok(format!(
            "{}/object/sign/{}/{}?token=t{}&expires={}",
            STORAGE_BASE,
            bucket,
            key,
            n,
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, bucket: &str, key: &str) -> StorageResult<String> {
        self.public_calls.fetch_add(1, Ordering::SeqCst);
        if self.private.contains(bucket) {
            return Err(StorageError::Unsupported(format!(
                "bucket {} has no public URL",
                bucket
            )));
        }
        Ok(public_url(bucket, key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Rest
    }
}

pub fn public_url(bucket: &str, key: &str) -> String {
    format!("{}/object/public/{}/{}", STORAGE_BASE, bucket, key)
}

/// Reachability fake answering by URL predicate and recording every check.
pub struct FakeVerifier {
    reachable: Box<dyn Fn(&str) -> bool + Send + Sync>,
    pub checked: Mutex<Vec<String>>,
}

impl FakeVerifier {
    pub fn new(reachable: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        FakeVerifier {
            reachable: Box::new(reachable),
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn all_reachable() -> Self {
        Self::new(|_| true)
    }

    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReachabilityCheck for FakeVerifier {
    async fn verify(&self, url: &str) -> bool {
        self.checked.lock().unwrap().push(url.to_string());
        (self.reachable)(url)
    }
}
