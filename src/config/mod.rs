//! Configuration module for Shiori-Reader
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every adapter-specific requirement (cache credentials, mirror
//! template shape) is checked eagerly at load time.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, BucketCacheConfig, CacheConfig, CacheProvider, Config, SalvageConfig,
    ServerConfig, SqliteCacheConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
