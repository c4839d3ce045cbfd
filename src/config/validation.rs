use crate::config::types::{BrowserConfig, CacheConfig, CacheProvider, Config, SalvageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_browser_config(&config.browser)?;
    validate_cache_config(&config.cache)?;
    validate_salvage_config(&config.salvage)?;
    Ok(())
}

/// Validates browser and pool settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport dimensions must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    if config.acquire_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "acquire-timeout-ms must be >= 1000ms, got {}ms",
            config.acquire_timeout_ms
        )));
    }

    if let Some(max) = config.max_workers {
        if max < 1 {
            return Err(ConfigError::Validation(
                "max-workers must be >= 1 when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates cache settings
///
/// Selecting a storage-backed provider without its required settings is a
/// construction-time error; the adapters themselves re-check at build time.
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.duration_ms <= 0 {
        return Err(ConfigError::Validation(format!(
            "cache duration-ms must be positive, got {}",
            config.duration_ms
        )));
    }

    match config.provider {
        CacheProvider::None | CacheProvider::Memory => {}

        CacheProvider::Sqlite => {
            let sqlite = config.sqlite.as_ref().ok_or_else(|| {
                ConfigError::Validation(
                    "cache provider 'sqlite' requires a [cache.sqlite] section".to_string(),
                )
            })?;
            if sqlite.database_path.is_empty() {
                return Err(ConfigError::Validation(
                    "cache.sqlite.database-path cannot be empty".to_string(),
                ));
            }
        }

        CacheProvider::Bucket => {
            let bucket = config.bucket.as_ref().ok_or_else(|| {
                ConfigError::Validation(
                    "cache provider 'bucket' requires a [cache.bucket] section".to_string(),
                )
            })?;
            if bucket.access_key.is_empty() {
                return Err(ConfigError::Validation(
                    "cache.bucket.access-key cannot be empty".to_string(),
                ));
            }
            if bucket.bucket.is_empty() {
                return Err(ConfigError::Validation(
                    "cache.bucket.bucket cannot be empty".to_string(),
                ));
            }
            Url::parse(&bucket.endpoint).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid cache.bucket.endpoint: {}", e))
            })?;
        }
    }

    Ok(())
}

/// Validates salvage settings
fn validate_salvage_config(config: &SalvageConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    if !config.mirror_template.contains("{url}") {
        return Err(ConfigError::Validation(
            "salvage mirror-template must contain a '{url}' placeholder".to_string(),
        ));
    }

    // The template must form a valid URL once the placeholder is filled
    let probe = config.mirror_template.replace("{url}", "probe");
    Url::parse(&probe)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid salvage mirror-template: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BucketCacheConfig, SqliteCacheConfig};

    fn base_config() -> Config {
        Config {
            server: Default::default(),
            browser: Default::default(),
            cache: Default::default(),
            salvage: Default::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_zero_viewport_rejected() {
        let mut config = base_config();
        config.browser.viewport_width = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_sqlite_provider_requires_section() {
        let mut config = base_config();
        config.cache.provider = CacheProvider::Sqlite;
        assert!(validate(&config).is_err());

        config.cache.sqlite = Some(SqliteCacheConfig {
            database_path: "./cache.db".to_string(),
        });
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_bucket_provider_requires_credentials() {
        let mut config = base_config();
        config.cache.provider = CacheProvider::Bucket;
        assert!(validate(&config).is_err());

        config.cache.bucket = Some(BucketCacheConfig {
            endpoint: "https://storage.example.com".to_string(),
            access_key: String::new(),
            bucket: "snapshots".to_string(),
        });
        assert!(validate(&config).is_err());

        config.cache.bucket = Some(BucketCacheConfig {
            endpoint: "https://storage.example.com".to_string(),
            access_key: "key".to_string(),
            bucket: "snapshots".to_string(),
        });
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_mirror_template_requires_placeholder() {
        let mut config = base_config();
        config.salvage.mirror_template = "https://mirror.example.com/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_disabled_salvage_skips_template_check() {
        let mut config = base_config();
        config.salvage.enabled = false;
        config.salvage.mirror_template = "not a template".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_nonpositive_cache_duration_rejected() {
        let mut config = base_config();
        config.cache.duration_ms = 0;
        assert!(validate(&config).is_err());
    }
}
