//! # Access Grants
//!
//! **S3 Access Grants credential resolution for S3 clients**
//!
//! Before an S3 request is signed, the plugin asks Access Grants for
//! temporary credentials scoped to the request's target and signs with
//! those instead of the requester's own:
//!
//! - **Prefix-aware caching** – one grant on `s3://bucket/logs/*` serves every
//!   object beneath it
//! - **Negative caching** – access denied responses are replayed for five
//!   minutes
//! - **Region routing** – each bucket's region is resolved once and its
//!   Access Grants client pooled
//! - **Fallback** – unsupported operations, and optionally any failure, are
//!   signed with the requester's credentials
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use accessgrants::prelude::*;
//!
//! let config = ConfigLoader::new()
//!     .with_optional_file("accessgrants.toml")?
//!     .with_env_prefix("ACCESS_GRANTS")
//!     .load()?;
//!
//! let plugin = AccessGrantsPlugin::builder(sts, s3, s3_control_factory)
//!     .config(config)
//!     .build()?;
//!
//! let request = S3Request::new("GetObject", "bucket").with_key("logs/app.log");
//! match plugin.signing_credentials(&requester, &request)? {
//!     SigningCredentials::AccessGrants(credentials) => sign_with(&credentials),
//!     SigningCredentials::Requester => sign_with_requester(),
//! }
//! ```
//!
//! ## Resolution
//!
//! ```text
//! operation → permission ─┐
//! request → s3 prefix ────┴→ CacheKey → denial cache → grants cache → GetDataAccess
//!                                                          ↑
//! bucket → region → regional client ───────────────────────┘
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod operation;
pub mod plugin;
pub mod request;

// Re-export core types
pub use accessgrants_core as core;

// Re-export caches
pub use accessgrants_cache as cache;

// Re-export configuration
pub use accessgrants_config as config;

// Re-export telemetry
pub use accessgrants_telemetry as telemetry;

pub use operation::permission_for_operation;
pub use plugin::{AccessGrantsPlugin, AccessGrantsPluginBuilder, SigningCredentials};
pub use request::S3Request;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use accessgrants::prelude::*;
/// ```
pub mod prelude {
    pub use accessgrants_core::{
        AccessGrantsClient, AccessGrantsClientFactory, AccessGrantsError, AccessGrantsResult,
        BucketProbeClient, CacheKey, Credentials, IdentityClient, Permission,
        RequesterCredentials, ServiceError,
    };

    // Re-export cache types
    pub use accessgrants_cache::{AccessGrantsCaches, CacheSettings};

    // Re-export configuration types
    pub use accessgrants_config::{AccessGrantsConfig, ConfigError, ConfigLoader};

    // Re-export telemetry setup
    pub use accessgrants_telemetry::{init_telemetry, LogConfig, MetricsConfig};

    pub use crate::operation::permission_for_operation;
    pub use crate::plugin::{AccessGrantsPlugin, SigningCredentials};
    pub use crate::request::S3Request;
}
