//! Archive-mirror salvage
//!
//! When a page renders to nothing useful, a public web-archive mirror of
//! the URL is tried instead. Salvage is strictly best-effort: the mirror
//! is probed over plain HTTP first, and any failure -- non-2xx probe,
//! navigation error, timeout -- leaves the original snapshot in place
//! without raising.

use crate::browser::Worker;
use crate::config::SalvageConfig;
use std::time::Duration;

/// Client for the configured archive mirror
pub struct SalvageClient {
    client: reqwest::Client,
    config: SalvageConfig,
}

impl SalvageClient {
    pub fn new(config: SalvageConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.probe_timeout_ms))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    /// Mirror address for a target URL
    ///
    /// The target is percent-encoded into the configured template, e.g.
    /// `https://…/search?q=cache:{url}`.
    pub fn mirror_url(&self, url: &str) -> String {
        self.config
            .mirror_template
            .replace("{url}", &urlencoding::encode(url))
    }

    /// Checks whether the mirror has a copy worth navigating to
    pub async fn probe(&self, mirror_url: &str) -> bool {
        let response = self
            .client
            .get(mirror_url)
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await;

        match response {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Salvage probe failed for {}: {}", mirror_url, e);
                false
            }
        }
    }

    /// Attempts to point the worker at the mirror copy
    ///
    /// Returns true only when the mirror responded 2xx and the worker
    /// reached it; the caller re-runs extraction in that case.
    pub async fn attempt(&self, url: &str, worker: &Worker) -> bool {
        if !self.config.enabled {
            return false;
        }

        tracing::info!("Salvaging {}", url);
        let mirror_url = self.mirror_url(url);

        if !self.probe(&mirror_url).await {
            tracing::warn!("No salvation found for url: {}", url);
            return false;
        }

        let timeout = Duration::from_millis(self.config.navigation_timeout_ms);
        match worker.navigate(&mirror_url, timeout, Duration::ZERO).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Salvage navigation did not succeed: {}", e);
                false
            }
        }
    }
}
