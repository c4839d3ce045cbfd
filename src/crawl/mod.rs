//! Crawl orchestration
//!
//! Drives the full protocol for one URL: cache lookup, worker acquisition,
//! navigation, best-effort extraction, the archive-mirror salvage
//! fallback, cache write-through, and unconditional worker release.

mod orchestrator;
mod salvage;

pub use orchestrator::Crawler;
pub use salvage::SalvageClient;

/// Request-scoped crawl options
#[derive(Debug, Clone, Copy)]
pub struct CrawlOptions {
    /// Capture a compressed screenshot alongside extraction
    pub use_screenshot: bool,

    /// Consult and populate the configured cache
    pub use_cache: bool,

    /// Deliver plaintext markdown rather than the structured object
    pub markdown: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            use_screenshot: false,
            use_cache: false,
            markdown: true,
        }
    }
}
