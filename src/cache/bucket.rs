//! Object-storage cache backend
//!
//! Speaks a bucket-style HTTP API: entries are JSON objects stored as
//! `<digest>.json` under a bucket, authorized by a bearer key. The client
//! is built once at construction and shared across requests; consistency
//! is delegated to the storage service.

use crate::cache::{Cache, CacheEntry, CacheError, CacheResult};
use crate::config::BucketCacheConfig;
use crate::snapshot::PageSnapshot;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// HTTP object-storage cache
pub struct BucketCache {
    client: Client,
    endpoint: String,
    access_key: String,
    bucket: String,
    duration_ms: i64,
}

impl BucketCache {
    /// Builds the adapter; missing credentials fail here, not at first use
    pub fn new(config: &BucketCacheConfig, duration_ms: i64) -> CacheResult<Self> {
        if config.endpoint.is_empty() {
            return Err(CacheError::Misconfigured(
                "bucket endpoint is empty".to_string(),
            ));
        }
        if config.access_key.is_empty() {
            return Err(CacheError::Misconfigured(
                "bucket access-key is empty".to_string(),
            ));
        }
        if config.bucket.is_empty() {
            return Err(CacheError::Misconfigured(
                "bucket name is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .build()
            .map_err(CacheError::Http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
            bucket: config.bucket.clone(),
            duration_ms,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}.json", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl Cache for BucketCache {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let response = self
            .client
            .get(self.object_url(key))
            .bearer_auth(&self.access_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CacheError::Backend(format!(
                "bucket get returned HTTP {}",
                response.status()
            )));
        }

        let entry: CacheEntry = response.json().await?;
        Ok(Some(entry))
    }

    async fn save(&self, url: &str, key: &str, snapshot: &PageSnapshot) -> CacheResult<()> {
        let entry = CacheEntry::new(url, key, snapshot, self.duration_ms);

        let response = self
            .client
            .put(self.object_url(key))
            .bearer_auth(&self.access_key)
            .header("x-upsert", "true")
            .json(&entry)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CacheError::Backend(format!(
                "bucket save returned HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.access_key)
            .send()
            .await?;

        // A missing object is already removed
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(CacheError::Backend(format!(
                "bucket remove returned HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}
