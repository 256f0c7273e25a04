//! Configuration section types.

use std::time::Duration;

use accessgrants_cache::config::{
    DEFAULT_ACCOUNT_ID_CACHE_SIZE, DEFAULT_ACCOUNT_ID_CACHE_TTL, DEFAULT_BUCKET_REGION_CACHE_SIZE,
    DEFAULT_BUCKET_REGION_CACHE_TTL, DEFAULT_CREDENTIALS_DURATION, DEFAULT_GRANTS_CACHE_SIZE,
};
use accessgrants_cache::{CacheConfig, GrantsCacheConfig};
use accessgrants_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Plugin behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Sign with the requester's own credentials when Access Grants fails.
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
        }
    }
}

/// Grants (credentials) cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GrantsCacheSection {
    /// Maximum number of cached grants.
    #[serde(default = "default_grants_max_entries")]
    pub max_entries: usize,

    /// Credential lifetime requested from Access Grants, in seconds.
    #[serde(default = "default_grants_duration_secs")]
    pub duration_secs: u64,
}

impl Default for GrantsCacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_grants_max_entries(),
            duration_secs: default_grants_duration_secs(),
        }
    }
}

impl GrantsCacheSection {
    /// Cache configuration for this section.
    pub fn to_cache_config(&self) -> GrantsCacheConfig {
        GrantsCacheConfig::new(self.max_entries, Duration::from_secs(self.duration_secs))
    }
}

fn default_grants_max_entries() -> usize {
    DEFAULT_GRANTS_CACHE_SIZE
}

fn default_grants_duration_secs() -> u64 {
    DEFAULT_CREDENTIALS_DURATION.as_secs()
}

/// Bucket-to-account cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AccountIdCacheSection {
    /// Maximum number of cached buckets.
    #[serde(default = "default_account_id_max_entries")]
    pub max_entries: usize,

    /// Entry TTL in seconds.
    #[serde(default = "default_account_id_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for AccountIdCacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_account_id_max_entries(),
            ttl_secs: default_account_id_ttl_secs(),
        }
    }
}

impl AccountIdCacheSection {
    /// Cache configuration for this section.
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.max_entries, Duration::from_secs(self.ttl_secs))
    }
}

fn default_account_id_max_entries() -> usize {
    DEFAULT_ACCOUNT_ID_CACHE_SIZE
}

fn default_account_id_ttl_secs() -> u64 {
    DEFAULT_ACCOUNT_ID_CACHE_TTL.as_secs()
}

/// Bucket-to-region cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BucketRegionCacheSection {
    /// Maximum number of cached buckets.
    #[serde(default = "default_bucket_region_max_entries")]
    pub max_entries: usize,

    /// Entry TTL in seconds.
    #[serde(default = "default_bucket_region_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for BucketRegionCacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_bucket_region_max_entries(),
            ttl_secs: default_bucket_region_ttl_secs(),
        }
    }
}

impl BucketRegionCacheSection {
    /// Cache configuration for this section.
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.max_entries, Duration::from_secs(self.ttl_secs))
    }
}

fn default_bucket_region_max_entries() -> usize {
    DEFAULT_BUCKET_REGION_CACHE_SIZE
}

fn default_bucket_region_ttl_secs() -> u64 {
    DEFAULT_BUCKET_REGION_CACHE_TTL.as_secs()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log filter (e.g. `info`, `accessgrants_cache=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Subscriber settings for this section.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            file_line_info: self.include_location,
            ..LogConfig::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsSection {
    /// Recorder settings for this section.
    pub fn to_metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_defaults_match_cache_defaults() {
        assert_eq!(
            GrantsCacheSection::default().to_cache_config(),
            GrantsCacheConfig::default()
        );
        assert_eq!(
            AccountIdCacheSection::default().to_cache_config(),
            CacheConfig::account_id()
        );
        assert_eq!(
            BucketRegionCacheSection::default().to_cache_config(),
            CacheConfig::bucket_region()
        );
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let section: BucketRegionCacheSection =
            serde_json::from_str(r#"{"max_entries": 5}"#).unwrap();
        assert_eq!(section.max_entries, 5);
        assert_eq!(section.ttl_secs, 300);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<GrantsCacheSection, _> = serde_json::from_str(r#"{"max_size": 5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);

        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_logging_to_log_config() {
        let logging = LoggingConfig {
            level: "accessgrants_cache=debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            ..LoggingConfig::default()
        };
        let config = logging.to_log_config();
        assert!(!config.json_format);
        assert!(config.file_line_info);
        assert_eq!(config.level, "accessgrants_cache=debug");
    }
}
