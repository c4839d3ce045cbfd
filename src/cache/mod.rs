//! Pluggable snapshot cache
//!
//! This module defines the cache contract, the persisted entry shape, and
//! cache-key derivation, plus construction of the one backend active per
//! process. Backends are a closed set selected by configuration; the
//! orchestrator only ever sees `Arc<dyn Cache>`.
//!
//! Freshness is two-layered: the backend TTL (`expire_at`) bounds storage
//! lifetime, while the read path additionally requires entries to be
//! younger than a short freshness window, so a slow-to-evict backend can
//! never serve stale content.

mod bucket;
mod memory;
mod sqlite;

pub use bucket::BucketCache;
pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use crate::config::{CacheConfig, CacheProvider};
use crate::snapshot::PageSnapshot;
use crate::url::cache_key_url;
use async_trait::async_trait;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Read-path freshness window layered on top of the backend TTL
pub const FRESHNESS_WINDOW_MS: i64 = 300_000;

/// Errors that can occur during cache operations
///
/// These never cross the orchestrator boundary: reads degrade to misses,
/// writes are logged and swallowed. Only construction errors are fatal.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache misconfigured: {0}")]
    Misconfigured(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Persisted cache entry wrapping one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub url: String,

    /// Epoch milliseconds at save time
    pub created_at: i64,

    /// Epoch milliseconds after which the entry is dead weight
    pub expire_at: i64,

    /// Lookup key; digest of the normalized URL
    pub url_digest: String,

    pub snapshot: PageSnapshot,
}

impl CacheEntry {
    /// Builds an entry stamped with the current time
    pub fn new(url: &str, key: &str, snapshot: &PageSnapshot, duration_ms: i64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            url: url.to_string(),
            created_at: now,
            expire_at: now + duration_ms,
            url_digest: key.to_string(),
            snapshot: snapshot.clone(),
        }
    }

    /// Past the backend TTL; must be deleted when a read discovers it
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expire_at
    }

    /// Within the short read-path freshness window
    pub fn is_fresh(&self, now: i64) -> bool {
        now - self.created_at < FRESHNESS_WINDOW_MS
    }
}

/// Uniform key/value contract over the configured backend
///
/// Implementations must tolerate concurrent reads and writes without
/// additional locking; last-write-wins on overlapping saves is acceptable.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetches an entry by digest; `None` when absent
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>>;

    /// Saves a snapshot under the digest, stamping `created_at`/`expire_at`
    async fn save(&self, url: &str, key: &str, snapshot: &PageSnapshot) -> CacheResult<()>;

    /// Removes an entry by digest; removing a missing key is not an error
    async fn remove(&self, key: &str) -> CacheResult<()>;
}

/// Derives the cache key for a URL
///
/// The fragment is stripped and the URL lowercased before hashing, so
/// addresses differing only by `#anchor` or letter case share an entry.
/// md5 is used as a fast digest; collision resistance is not a
/// requirement here, only deduplication.
pub fn url_digest(url: &Url) -> String {
    let normalized = cache_key_url(url);
    hex::encode(Md5::digest(normalized.as_bytes()))
}

/// Read-through lookup applying the freshness rules
///
/// Hard-expired entries are deleted from the backend as a side effect of
/// the read that discovers them. Entries older than the freshness window
/// count as misses even when the backend TTL has not elapsed. Read
/// failures degrade to misses and are never surfaced.
pub async fn fresh_lookup(cache: &dyn Cache, key: &str) -> Option<PageSnapshot> {
    let entry = match cache.get(key).await {
        Ok(Some(entry)) => entry,
        Ok(None) => return None,
        Err(error) => {
            tracing::error!("Failed to fetch snapshot from cache: {}", error);
            return None;
        }
    };

    let now = chrono::Utc::now().timestamp_millis();

    if entry.is_expired(now) {
        if let Err(error) = cache.remove(key).await {
            tracing::warn!("Failed to remove expired cache entry: {}", error);
        }
        return None;
    }

    if !entry.is_fresh(now) {
        return None;
    }

    Some(entry.snapshot)
}

/// Constructs the backend named by configuration
///
/// Returns `None` for the `none` provider. A provider missing its
/// required settings fails here, at startup, never at first use.
pub fn build_cache(config: &CacheConfig) -> CacheResult<Option<Arc<dyn Cache>>> {
    match config.provider {
        CacheProvider::None => Ok(None),

        CacheProvider::Memory => Ok(Some(Arc::new(MemoryCache::new(config.duration_ms)))),

        CacheProvider::Sqlite => {
            let settings = config.sqlite.as_ref().ok_or_else(|| {
                CacheError::Misconfigured("missing [cache.sqlite] section".to_string())
            })?;
            let cache = SqliteCache::new(&settings.database_path, config.duration_ms)?;
            Ok(Some(Arc::new(cache)))
        }

        CacheProvider::Bucket => {
            let settings = config.bucket.as_ref().ok_or_else(|| {
                CacheError::Misconfigured("missing [cache.bucket] section".to_string())
            })?;
            let cache = BucketCache::new(settings, config.duration_ms)?;
            Ok(Some(Arc::new(cache)))
        }
    }
}
