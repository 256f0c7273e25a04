//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::{AccessGrantsConfig, ConfigError, LogFormat};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use accessgrants_config::ConfigLoader;
///
/// # fn main() -> Result<(), accessgrants_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("accessgrants.toml")?
///     .with_env_prefix("ACCESS_GRANTS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: AccessGrantsConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AccessGrantsConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is what `new()` starts from, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = AccessGrantsConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// ```
    /// use accessgrants_config::{ConfigLoader, LogFormat};
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = AccessGrantsConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = AccessGrantsConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, chosen by extension.
    /// Sections missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// ```
    /// use accessgrants_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [grants_cache]
    ///     max_entries = 500
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.grants_cache.max_entries, 500);
    /// assert_eq!(config.grants_cache.duration_secs, 3600);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `ACCESS_GRANTS__GRANTS_CACHE__MAX_ENTRIES=5000` or
    /// `ACCESS_GRANTS__PLUGIN__FALLBACK_ENABLED=false`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the working directory, if present.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible for parity with the other sources.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Ok(self)
    }

    /// Load environment variables from a specific `.env` file.
    ///
    /// Variables already set in the process environment are not replaced.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read or parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| {
            let error = std::io::Error::new(std::io::ErrorKind::InvalidData, e);
            ConfigError::read_error(path, error)
        })?;
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable does not parse or
    /// validation fails.
    pub fn load(mut self) -> Result<AccessGrantsConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> AccessGrantsConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<AccessGrantsConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(key_without_prefix) = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
        else {
            // Shares the prefix but is not one of ours, e.g. ACCESS_GRANTS_HOME.
            return Ok(());
        };

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["PLUGIN", "FALLBACK_ENABLED"] => {
                self.config.plugin.fallback_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["GRANTS_CACHE", "MAX_ENTRIES"] => {
                self.config.grants_cache.max_entries = parse_number(key, value)?;
            }
            ["GRANTS_CACHE", "DURATION_SECS"] => {
                self.config.grants_cache.duration_secs = parse_number(key, value)?;
            }
            ["ACCOUNT_ID_CACHE", "MAX_ENTRIES"] => {
                self.config.account_id_cache.max_entries = parse_number(key, value)?;
            }
            ["ACCOUNT_ID_CACHE", "TTL_SECS"] => {
                self.config.account_id_cache.ttl_secs = parse_number(key, value)?;
            }
            ["BUCKET_REGION_CACHE", "MAX_ENTRIES"] => {
                self.config.bucket_region_cache.max_entries = parse_number(key, value)?;
            }
            ["BUCKET_REGION_CACHE", "TTL_SECS"] => {
                self.config.bucket_region_cache.ttl_secs = parse_number(key, value)?;
            }
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["METRICS", "ENABLED"] => {
                self.config.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            // Unknown keys are ignored
            _ => {}
        }
        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, AccessGrantsConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [plugin]
            fallback_enabled = false

            [bucket_region_cache]
            ttl_secs = 60
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert!(!config.plugin.fallback_enabled);
        assert_eq!(config.bucket_region_cache.ttl_secs, 60);
        assert_eq!(config.bucket_region_cache.max_entries, 1000);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"grants_cache": {"max_entries": 10, "duration_secs": 900}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.grants_cache.max_entries, 10);
        assert_eq!(config.grants_cache.duration_secs, 900);
    }

    #[test]
    fn test_loader_unknown_format() {
        let result = ConfigLoader::new().with_string("a: 1", "yaml");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_rejects_unknown_section() {
        let result = ConfigLoader::new().with_string("[server]\nport = 1", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/accessgrants.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/accessgrants.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, AccessGrantsConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let toml = "[grants_cache]\nduration_secs = 86400";
        let result = ConfigLoader::new().with_string(toml, "toml").unwrap().load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_unvalidated() {
        let toml = "[grants_cache]\nduration_secs = 86400";
        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.grants_cache.duration_secs, 86400);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_apply_env_var_plugin() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__PLUGIN__FALLBACK_ENABLED", "false", "TEST")
            .unwrap();
        assert!(!loader.config.plugin.fallback_enabled);
    }

    #[test]
    fn test_apply_env_var_caches() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__GRANTS_CACHE__MAX_ENTRIES", "5000", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__GRANTS_CACHE__DURATION_SECS", "7200", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ACCOUNT_ID_CACHE__TTL_SECS", "120", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__BUCKET_REGION_CACHE__MAX_ENTRIES", "42", "TEST")
            .unwrap();

        assert_eq!(loader.config.grants_cache.max_entries, 5000);
        assert_eq!(loader.config.grants_cache.duration_secs, 7200);
        assert_eq!(loader.config.account_id_cache.ttl_secs, 120);
        assert_eq!(loader.config.bucket_region_cache.max_entries, 42);
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__LOGGING__LEVEL", "accessgrants_cache=debug", "TEST")
            .unwrap();
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert_eq!(loader.config.logging.level, "accessgrants_cache=debug");
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(matches!(
            loader.apply_env_var("TEST__GRANTS_CACHE__MAX_ENTRIES", "lots", "TEST"),
            Err(ConfigError::EnvParseError { .. })
        ));
        assert!(loader
            .apply_env_var("TEST__METRICS__ENABLED", "maybe", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_keys() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__UNKNOWN__KEY", "1", "TEST").unwrap();
        loader.apply_env_var("TEST_HOME", "/tmp", "TEST").unwrap();
        assert_eq!(loader.config, AccessGrantsConfig::default());
    }
}
