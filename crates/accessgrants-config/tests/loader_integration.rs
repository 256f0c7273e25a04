//! Integration tests for loading configuration files from disk.

use std::io::Write;
use std::time::Duration;

use accessgrants_config::{AccessGrantsConfig, ConfigError, ConfigLoader, LogFormat};
use tempfile::{Builder, NamedTempFile};

fn write_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .prefix("accessgrants")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A full TOML file populates every section.
#[test]
fn test_load_toml_file() {
    let file = write_config(
        ".toml",
        r#"
            [plugin]
            fallback_enabled = false

            [grants_cache]
            max_entries = 2000
            duration_secs = 900

            [account_id_cache]
            max_entries = 50
            ttl_secs = 600

            [bucket_region_cache]
            max_entries = 60
            ttl_secs = 120

            [logging]
            level = "accessgrants_cache=debug"
            format = "pretty"

            [metrics]
            enabled = false
        "#,
    );

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert!(!config.plugin.fallback_enabled);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(!config.metrics.enabled);

    let settings = config.cache_settings();
    assert_eq!(settings.grants.max_entries, 2000);
    assert_eq!(settings.grants.duration, Duration::from_secs(900));
    assert_eq!(settings.account_id.max_entries, 50);
    assert_eq!(settings.account_id.ttl, Duration::from_secs(600));
    assert_eq!(settings.bucket_region.max_entries, 60);
    assert_eq!(settings.bucket_region.ttl, Duration::from_secs(120));
}

/// JSON files are parsed by extension and missing sections keep defaults.
#[test]
fn test_load_json_file() {
    let file = write_config(".json", r#"{"grants_cache": {"duration_secs": 43200}}"#);

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.grants_cache.duration_secs, 43_200);
    assert_eq!(config.grants_cache.max_entries, 30_000);
    assert_eq!(
        config.bucket_region_cache,
        AccessGrantsConfig::default().bucket_region_cache
    );
}

/// Typos in field names are rejected rather than silently ignored.
#[test]
fn test_unknown_field_rejected() {
    let file = write_config(".toml", "[grants_cache]\nmax_size = 10\n");

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

/// Values beyond the cache maxima fail validation on load.
#[test]
fn test_maxima_rejected() {
    let file = write_config(".toml", "[grants_cache]\nmax_entries = 1000001\n");
    let result = ConfigLoader::new().with_file(file.path()).unwrap().load();
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "grants_cache.max_entries"
    ));

    let file = write_config(".json", r#"{"bucket_region_cache": {"ttl_secs": 0}}"#);
    let result = ConfigLoader::new().with_file(file.path()).unwrap().load();
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "bucket_region_cache.ttl_secs"
    ));
}

/// An existing optional file is loaded.
#[test]
fn test_optional_file_present() {
    let file = write_config(".toml", "[account_id_cache]\nttl_secs = 30\n");

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.account_id_cache.ttl_secs, 30);
}

/// Files without a known extension are refused.
#[test]
fn test_unsupported_extension() {
    let file = write_config(".yaml", "grants_cache:\n  max_entries: 10\n");

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

/// Malformed JSON surfaces as a JSON error.
#[test]
fn test_malformed_json() {
    let file = write_config(".json", "{\"grants_cache\": ");

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::JsonError(_))));
}

/// A missing explicit `.env` file is a read error.
#[test]
fn test_missing_dotenv_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ConfigLoader::new().with_dotenv_file(dir.path().join("missing.env"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}
