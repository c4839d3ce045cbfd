//! Browser worker
//!
//! A worker is one isolated page, prepared once at creation: CSP bypass,
//! a fixed viewport, the snapshot extraction script installed before any
//! navigation, and a host callback binding reserved for push-based
//! extraction. Workers are only ever driven by one crawl at a time; the
//! pool enforces that.

use crate::browser::{PoolError, PoolResult};
use crate::config::BrowserConfig;
use crate::snapshot::{PageSnapshot, RawSnapshot, SNAPSHOT_BINDING, SNAPSHOT_EXPRESSION, SNAPSHOT_SCRIPT};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, SetBypassCspParams,
};
use chromiumoxide::cdp::js_protocol::runtime::AddBindingParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use std::time::Duration;

/// JPEG quality used for crawl screenshots
const SCREENSHOT_QUALITY: i64 = 75;

/// Ceiling for the health-check evaluation
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// One prepared, isolated browsing context
pub struct Worker {
    page: Page,
    id: u64,
}

impl Worker {
    /// Creates a page and applies the standard preparations
    pub(crate) async fn create(
        browser: &Browser,
        config: &BrowserConfig,
        id: u64,
    ) -> PoolResult<Self> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PoolError::Worker(format!("failed to create page: {}", e)))?;

        let bypass_csp = SetBypassCspParams::builder()
            .enabled(true)
            .build()
            .map_err(PoolError::Worker)?;
        page.execute(bypass_csp)
            .await
            .map_err(|e| PoolError::Worker(format!("failed to bypass CSP: {}", e)))?;

        let viewport = SetDeviceMetricsOverrideParams::builder()
            .width(config.viewport_width as i64)
            .height(config.viewport_height as i64)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(PoolError::Worker)?;
        page.execute(viewport)
            .await
            .map_err(|e| PoolError::Worker(format!("failed to set viewport: {}", e)))?;

        let binding = AddBindingParams::builder()
            .name(SNAPSHOT_BINDING)
            .build()
            .map_err(PoolError::Worker)?;
        page.execute(binding)
            .await
            .map_err(|e| PoolError::Worker(format!("failed to add binding: {}", e)))?;

        let script = AddScriptToEvaluateOnNewDocumentParams::builder()
            .source(SNAPSHOT_SCRIPT)
            .build()
            .map_err(PoolError::Worker)?;
        page.execute(script)
            .await
            .map_err(|e| PoolError::Worker(format!("failed to install snapshot script: {}", e)))?;

        tracing::debug!("Worker {} created", id);
        Ok(Self { page, id })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Navigates to `url`, waiting for the load signals plus a short
    /// settle window, all bounded by the hard navigation ceiling.
    pub async fn navigate(
        &self,
        url: &str,
        timeout: Duration,
        settle: Duration,
    ) -> PoolResult<()> {
        let outcome = tokio::time::timeout(timeout, async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            // Grace period for late network activity after the load event
            tokio::time::sleep(settle).await;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        match outcome {
            Err(_) => Err(PoolError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Ok(Err(e)) => Err(PoolError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Ok(Ok(())) => Ok(()),
        }
    }

    /// Runs the in-page extraction and projects the full snapshot
    ///
    /// Works against whatever document state exists, including error pages
    /// left behind by a failed navigation.
    pub async fn extract_snapshot(&self) -> PoolResult<PageSnapshot> {
        let raw: RawSnapshot = self
            .page
            .evaluate(SNAPSHOT_EXPRESSION)
            .await
            .map_err(|e| PoolError::Worker(format!("snapshot evaluation failed: {}", e)))?
            .into_value()
            .map_err(|e| PoolError::Worker(format!("snapshot deserialization failed: {}", e)))?;

        Ok(raw.into_snapshot())
    }

    /// Captures a compressed screenshot of the current viewport, base64-encoded
    pub async fn capture_screenshot(&self) -> PoolResult<String> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(SCREENSHOT_QUALITY)
            .build();

        let bytes = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| PoolError::Worker(format!("screenshot failed: {}", e)))?;

        Ok(BASE64.encode(bytes))
    }

    /// Health check: the page must still answer a trivial evaluation
    ///
    /// A worker that fails this is destroyed rather than reused.
    pub async fn is_healthy(&self) -> bool {
        matches!(
            tokio::time::timeout(HEALTH_CHECK_TIMEOUT, self.page.evaluate("1 + 1")).await,
            Ok(Ok(_))
        )
    }

    /// Destroys the worker's page; errors are logged, not surfaced
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            tracing::debug!("Failed to close worker {}: {}", self.id, e);
        }
    }

    /// Consumes the worker, handing the page back for Drop-time cleanup
    pub(crate) fn into_page(self) -> (u64, Page) {
        (self.id, self.page)
    }
}
