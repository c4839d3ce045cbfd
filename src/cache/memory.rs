//! In-process cache backend
//!
//! Holds entries in a plain map. Useful for single-node deployments and
//! as the reference implementation the integration tests exercise.

use crate::cache::{Cache, CacheEntry, CacheResult};
use crate::snapshot::PageSnapshot;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Map-backed cache; the mutex is held only for map access, never across awaits
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    duration_ms: i64,
}

impl MemoryCache {
    pub fn new(duration_ms: i64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            duration_ms,
        }
    }

    /// Seeds an entry verbatim, bypassing the save-time stamping
    ///
    /// Lets tests place entries with explicit timestamps on either side of
    /// the freshness and expiry boundaries.
    pub fn insert(&self, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.url_digest.clone(), entry);
    }

    /// Number of stored entries (for tests and introspection)
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, url: &str, key: &str, snapshot: &PageSnapshot) -> CacheResult<()> {
        let entry = CacheEntry::new(url, key, snapshot, self.duration_ms);
        self.entries.lock().unwrap().insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
