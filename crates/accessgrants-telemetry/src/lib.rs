//! Observability for the S3 Access Grants credential cache.
//!
//! - **Logging**: structured logs via `tracing-subscriber` (JSON or pretty)
//! - **Metrics**: cache and remote-call counters via the `metrics` crate,
//!   exportable in Prometheus format
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `accessgrants_cache_lookups_total` | Counter | `cache`, `result` | Cache lookups by outcome |
//! | `accessgrants_cache_evictions_total` | Counter | `cache` | Entries evicted for capacity |
//! | `accessgrants_remote_calls_total` | Counter | `operation`, `outcome` | Calls to remote services |
//! | `accessgrants_fallbacks_total` | Counter | `reason` | Requests signed with the requester's own credentials |
//!
//! # Example
//!
//! ```rust,ignore
//! use accessgrants_telemetry::{init_telemetry, LogConfig, MetricsConfig};
//!
//! init_telemetry(&LogConfig::production(), &MetricsConfig::default())?;
//! tracing::info!("access grants plugin ready");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(
    log_config: &LogConfig,
    metrics_config: &MetricsConfig,
) -> TelemetryResult<Option<MetricsRegistry>> {
    init_logging(log_config)?;
    init_metrics(metrics_config)
}
