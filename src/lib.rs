//! Shiori-Reader: a rendering web page reader
//!
//! This crate fetches a single URL through a pooled headless-browser worker,
//! extracts its readable content, converts it to markdown, and optionally
//! caches the resulting snapshot behind a pluggable cache backend.

pub mod browser;
pub mod cache;
pub mod config;
pub mod crawl;
pub mod format;
pub mod server;
pub mod snapshot;
pub mod url;

use thiserror::Error;

/// Main error type for Shiori-Reader operations
#[derive(Debug, Error)]
pub enum ShioriError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Browser pool error: {0}")]
    Pool(#[from] browser::PoolError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::CacheError),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Shiori-Reader operations
pub type Result<T> = std::result::Result<T, ShioriError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawl::{CrawlOptions, Crawler};
pub use snapshot::{ImageBrief, PageSnapshot, ParsedArticle};
pub use url::{cache_key_url, validate_crawl_url};
