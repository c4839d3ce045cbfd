//! Crawl orchestrator
//!
//! Owns the long-lived collaborators (worker pool, cache, salvage client)
//! and runs the per-URL protocol. The invariants that matter here:
//! extraction is attempted after navigation settles whether or not it
//! succeeded, the cache write is awaited before the worker is released,
//! and the worker is released on every exit path.

use crate::browser::{EngineStatus, PoolError, Worker, WorkerPool};
use crate::cache::{url_digest, Cache};
use crate::config::Config;
use crate::crawl::{CrawlOptions, SalvageClient};
use crate::snapshot::PageSnapshot;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Crawl orchestration service
pub struct Crawler {
    pool: Arc<WorkerPool>,
    cache: Option<Arc<dyn Cache>>,
    salvage: SalvageClient,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl Crawler {
    /// Creates the orchestrator from its long-lived collaborators
    pub fn new(pool: Arc<WorkerPool>, cache: Option<Arc<dyn Cache>>, config: &Config) -> Self {
        Self {
            pool,
            cache,
            salvage: SalvageClient::new(config.salvage.clone()),
            navigation_timeout: Duration::from_millis(config.browser.navigation_timeout_ms),
            settle_delay: Duration::from_millis(config.browser.settle_delay_ms),
        }
    }

    /// Engine status as observed through the pool
    pub fn status(&self) -> EngineStatus {
        self.pool.status()
    }

    /// Crawls one URL
    ///
    /// Returns the snapshot, `Ok(None)` when nothing could be produced
    /// without a navigation error to blame, or the navigation error when
    /// extraction yielded nothing usable either.
    pub async fn crawl(&self, url: &Url, options: CrawlOptions) -> Result<Option<PageSnapshot>> {
        let digest = url_digest(url);

        if options.use_cache {
            if let Some(snapshot) = self.lookup_cache(&digest).await {
                tracing::debug!("Cache hit for {}", url);
                return Ok(Some(snapshot));
            }
        }

        let worker = self.pool.acquire().await?;

        let (navigation_error, snapshot) = self.render_and_extract(&worker, url, options).await;

        // The write is awaited before release so a cached snapshot can
        // never lag behind restored pool capacity.
        if options.use_cache {
            if let Some(snapshot) = &snapshot {
                self.save_to_cache(url.as_str(), &digest, snapshot).await;
            }
        }

        self.pool.release(worker).await;

        match (snapshot, navigation_error) {
            (Some(snapshot), _) => {
                tracing::info!(
                    "Snapshot of {} done (title: {:?}, href: {})",
                    url,
                    snapshot.title,
                    snapshot.href
                );
                Ok(Some(snapshot))
            }
            (None, Some(error)) => Err(error.into()),
            (None, None) => Ok(None),
        }
    }

    /// Navigate, then extract best-effort regardless of the outcome
    ///
    /// A navigation failure is retained, not raised: partially-failed
    /// navigations still surface whatever content the engine exposes, and
    /// the error only matters if nothing else worked.
    async fn render_and_extract(
        &self,
        worker: &Worker,
        url: &Url,
        options: CrawlOptions,
    ) -> (Option<PoolError>, Option<PageSnapshot>) {
        let navigation_error = worker
            .navigate(url.as_str(), self.navigation_timeout, self.settle_delay)
            .await
            .err();
        if let Some(error) = &navigation_error {
            tracing::error!("Browsing of {} failed: {}", url, error);
        }

        let mut screenshot = if options.use_screenshot {
            self.try_screenshot(worker, url).await
        } else {
            None
        };

        let mut snapshot = match worker.extract_snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::warn!("Extraction failed for {}: {}", url, error);
                None
            }
        };

        // Salvage when the page yielded nothing meaningful
        let degenerate = snapshot.as_ref().map_or(true, PageSnapshot::is_degenerate);
        if degenerate && self.salvage.attempt(url.as_str(), worker).await {
            if options.use_screenshot {
                screenshot = self.try_screenshot(worker, url).await;
            }
            match worker.extract_snapshot().await {
                Ok(salvaged) => snapshot = Some(salvaged),
                Err(error) => {
                    tracing::warn!("Extraction of salvaged copy failed for {}: {}", url, error);
                }
            }
        }

        if let Some(snapshot) = &mut snapshot {
            snapshot.screenshot = screenshot;
        }

        (navigation_error, snapshot)
    }

    async fn try_screenshot(&self, worker: &Worker, url: &Url) -> Option<String> {
        match worker.capture_screenshot().await {
            Ok(screenshot) => Some(screenshot),
            Err(error) => {
                tracing::warn!("Screenshot failed for {}: {}", url, error);
                None
            }
        }
    }

    /// Cache read path; see [`crate::cache::fresh_lookup`] for the rules
    async fn lookup_cache(&self, digest: &str) -> Option<PageSnapshot> {
        let cache = match &self.cache {
            Some(cache) => cache,
            None => {
                tracing::debug!("Cache requested but no provider is configured");
                return None;
            }
        };

        crate::cache::fresh_lookup(cache.as_ref(), digest).await
    }

    /// Cache write path; failures are logged and swallowed
    async fn save_to_cache(&self, url: &str, digest: &str, snapshot: &PageSnapshot) {
        let Some(cache) = &self.cache else {
            return;
        };

        if let Err(error) = cache.save(url, digest, snapshot).await {
            tracing::error!("Failed to save cache for {}: {}", url, error);
        }
    }
}
