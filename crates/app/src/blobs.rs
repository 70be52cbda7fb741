//! Image storage.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::Mutex;

/// Largest image the back office accepts.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from storage: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `name` and return the public URL.
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError>;
}

/// Configuration for a storage bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Project URL.
    pub url: String,

    /// API key sent with every request.
    pub api_key: String,

    /// Bucket product images are written to.
    pub bucket: String,
}

/// Object storage bucket over HTTP.
#[derive(Debug, Clone)]
pub struct StorageBlobStore {
    config: StorageConfig,
    http: Client,
}

impl StorageBlobStore {
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn object_url(&self, visibility: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{visibility}{}/{name}",
            self.config.url.trim_end_matches('/'),
            self.config.bucket
        )
    }
}

#[async_trait]
impl BlobStore for StorageBlobStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        let response = self
            .http
            .post(self.object_url("", name))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(BlobError::UnexpectedResponse(format!(
                "upload failed with status {status}: {text}"
            )));
        }

        Ok(self.object_url("public/", name))
    }
}

/// Bucket kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<FxHashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the stored object, if any.
    pub async fn size_of(&self, name: &str) -> Option<usize> {
        self.objects.lock().await.get(name).map(Vec::len)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        self.objects.lock().await.insert(name.to_string(), bytes);

        Ok(format!("memory://{name}"))
    }
}
