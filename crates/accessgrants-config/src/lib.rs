//! Typed configuration for the S3 Access Grants credential cache.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! The loaded [`AccessGrantsConfig`] converts into the cache, logging and
//! metrics settings the other crates take.
//!
//! # Example
//!
//! ```no_run
//! use accessgrants_config::ConfigLoader;
//!
//! # fn main() -> Result<(), accessgrants_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("accessgrants.toml")?
//!     .with_env_prefix("ACCESS_GRANTS")
//!     .load()?;
//!
//! let settings = config.cache_settings();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [plugin]
//! fallback_enabled = true
//!
//! [grants_cache]
//! max_entries = 30000
//! duration_secs = 3600
//!
//! [account_id_cache]
//! max_entries = 1000
//! ttl_secs = 3600
//!
//! [bucket_region_cache]
//! max_entries = 1000
//! ttl_secs = 300
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `ACCESS_GRANTS__PLUGIN__FALLBACK_ENABLED=false`
//! - `ACCESS_GRANTS__GRANTS_CACHE__DURATION_SECS=7200`
//! - `ACCESS_GRANTS__LOGGING__LEVEL=accessgrants_cache=debug`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::AccessGrantsConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
