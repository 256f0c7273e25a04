//! Main configuration type.

use accessgrants_cache::config::{MAX_CACHE_ENTRIES, MAX_CREDENTIALS_DURATION, MAX_RESOLVER_TTL};
use accessgrants_cache::CacheSettings;
use accessgrants_telemetry::logging::create_env_filter;
use accessgrants_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};

use crate::{
    AccountIdCacheSection, BucketRegionCacheSection, ConfigError, GrantsCacheSection, LogFormat,
    LoggingConfig, MetricsSection, PluginConfig,
};

/// Complete Access Grants plugin configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use accessgrants_config::AccessGrantsConfig;
///
/// let config = AccessGrantsConfig::default();
/// assert!(config.plugin.fallback_enabled);
/// assert_eq!(config.grants_cache.max_entries, 30_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AccessGrantsConfig {
    /// Plugin behavior.
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Grants (credentials) cache.
    #[serde(default)]
    pub grants_cache: GrantsCacheSection,

    /// Bucket-to-account cache.
    #[serde(default)]
    pub account_id_cache: AccountIdCacheSection,

    /// Bucket-to-region cache.
    #[serde(default)]
    pub bucket_region_cache: BucketRegionCacheSection,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl AccessGrantsConfig {
    /// Development preset: pretty debug logs with source locations.
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: JSON logs at `info`.
    pub fn production() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a cache size or lifetime is out
    /// of range, or the log filter does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_max_entries("grants_cache.max_entries", self.grants_cache.max_entries)?;
        check_secs(
            "grants_cache.duration_secs",
            self.grants_cache.duration_secs,
            MAX_CREDENTIALS_DURATION.as_secs(),
        )?;

        check_max_entries(
            "account_id_cache.max_entries",
            self.account_id_cache.max_entries,
        )?;
        check_secs(
            "account_id_cache.ttl_secs",
            self.account_id_cache.ttl_secs,
            MAX_RESOLVER_TTL.as_secs(),
        )?;

        check_max_entries(
            "bucket_region_cache.max_entries",
            self.bucket_region_cache.max_entries,
        )?;
        check_secs(
            "bucket_region_cache.ttl_secs",
            self.bucket_region_cache.ttl_secs,
            MAX_RESOLVER_TTL.as_secs(),
        )?;

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Settings for [`AccessGrantsCaches`](accessgrants_cache::AccessGrantsCaches).
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            grants: self.grants_cache.to_cache_config(),
            account_id: self.account_id_cache.to_cache_config(),
            bucket_region: self.bucket_region_cache.to_cache_config(),
        }
    }

    /// Logging subscriber settings.
    pub fn log_config(&self) -> LogConfig {
        self.logging.to_log_config()
    }

    /// Metrics recorder settings.
    pub fn metrics_config(&self) -> MetricsConfig {
        self.metrics.to_metrics_config()
    }
}

fn check_max_entries(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_CACHE_ENTRIES {
        return Err(ConfigError::invalid_value(
            field,
            format!("must be between 1 and {MAX_CACHE_ENTRIES}, got {value}"),
        ));
    }
    Ok(())
}

fn check_secs(field: &str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::invalid_value(
            field,
            format!("must be between 1 and {max} seconds, got {value}"),
        ));
    }
    Ok(())
}
