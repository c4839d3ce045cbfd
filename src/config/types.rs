use serde::Deserialize;

/// Main configuration structure for Shiori-Reader
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub salvage: SalvageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Rendering engine and worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Fixed viewport width for every worker
    #[serde(rename = "viewport-width", default = "default_viewport")]
    pub viewport_width: u32,

    /// Fixed viewport height for every worker
    #[serde(rename = "viewport-height", default = "default_viewport")]
    pub viewport_height: u32,

    /// Hard ceiling for a single navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,

    /// Grace period after the load event for late network activity (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// How long an acquisition may wait for a free worker (milliseconds)
    #[serde(rename = "acquire-timeout-ms", default = "default_acquire_timeout")]
    pub acquire_timeout_ms: u64,

    /// Overrides the memory-derived maximum pool size when set
    #[serde(rename = "max-workers")]
    pub max_workers: Option<usize>,
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Which backend holds cached snapshots
    #[serde(default)]
    pub provider: CacheProvider,

    /// Backend time-to-live applied on save (milliseconds)
    #[serde(rename = "duration-ms", default = "default_cache_duration")]
    pub duration_ms: i64,

    /// Settings for the sqlite document-store backend
    pub sqlite: Option<SqliteCacheConfig>,

    /// Settings for the bucket object-storage backend
    pub bucket: Option<BucketCacheConfig>,
}

/// The closed set of cache backends selectable at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheProvider {
    #[default]
    None,
    Memory,
    Sqlite,
    Bucket,
}

/// Sqlite cache backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteCacheConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Bucket (object storage) cache backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct BucketCacheConfig {
    /// Base endpoint of the storage service
    pub endpoint: String,

    /// Bearer key authorizing bucket access
    #[serde(rename = "access-key")]
    pub access_key: String,

    /// Bucket holding serialized entries
    pub bucket: String,
}

/// Archive-mirror salvage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SalvageConfig {
    /// Whether the salvage fallback runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Mirror address template; `{url}` is replaced by the encoded target
    #[serde(rename = "mirror-template", default = "default_mirror_template")]
    pub mirror_template: String,

    /// User agent presented to the mirror probe
    #[serde(rename = "user-agent", default = "default_salvage_user_agent")]
    pub user_agent: String,

    /// Ceiling for the mirror availability probe (milliseconds)
    #[serde(rename = "probe-timeout-ms", default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// Ceiling for navigating to the mirror copy (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_salvage_navigation_timeout")]
    pub navigation_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport(),
            viewport_height: default_viewport(),
            navigation_timeout_ms: default_navigation_timeout(),
            settle_delay_ms: default_settle_delay(),
            acquire_timeout_ms: default_acquire_timeout(),
            max_workers: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: CacheProvider::None,
            duration_ms: default_cache_duration(),
            sqlite: None,
            bucket: None,
        }
    }
}

impl Default for SalvageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mirror_template: default_mirror_template(),
            user_agent: default_salvage_user_agent(),
            probe_timeout_ms: default_probe_timeout(),
            navigation_timeout_ms: default_salvage_navigation_timeout(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_viewport() -> u32 {
    1024
}

fn default_navigation_timeout() -> u64 {
    30_000
}

fn default_settle_delay() -> u64 {
    500
}

fn default_acquire_timeout() -> u64 {
    60_000
}

fn default_cache_duration() -> i64 {
    1000 * 3600 * 24 * 7
}

fn default_true() -> bool {
    true
}

fn default_mirror_template() -> String {
    "https://webcache.googleusercontent.com/search?q=cache:{url}".to_string()
}

fn default_salvage_user_agent() -> String {
    "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; ShioriReader/1.0)".to_string()
}

fn default_probe_timeout() -> u64 {
    10_000
}

fn default_salvage_navigation_timeout() -> u64 {
    15_000
}
