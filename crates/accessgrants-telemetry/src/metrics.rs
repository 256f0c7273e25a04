//! Prometheus metrics for the credential cache.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `accessgrants_cache_lookups_total` | Counter | `cache`, `result` | Lookups (`hit`, `miss`, `expired`) |
//! | `accessgrants_cache_evictions_total` | Counter | `cache` | Capacity evictions |
//! | `accessgrants_remote_calls_total` | Counter | `operation`, `outcome` | Remote calls (`ok`, `denied`, `error`) |
//! | `accessgrants_fallbacks_total` | Counter | `reason` | Fallbacks to requester credentials |
//!
//! Recording functions are safe to call before [`init_metrics`]; without an
//! installed recorder they do nothing.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names.
pub mod names {
    /// Cache lookups by cache and result.
    pub const CACHE_LOOKUPS: &str = "accessgrants_cache_lookups_total";

    /// Capacity evictions by cache.
    pub const CACHE_EVICTIONS: &str = "accessgrants_cache_evictions_total";

    /// Remote calls by operation and outcome.
    pub const REMOTE_CALLS: &str = "accessgrants_remote_calls_total";

    /// Fallbacks to the requester's own credentials.
    pub const FALLBACKS: &str = "accessgrants_fallbacks_total";
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult {
    /// Live entry found.
    Hit,
    /// No entry.
    Miss,
    /// Entry found but past its TTL.
    Expired,
}

impl LookupResult {
    /// Label value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Expired => "expired",
        }
    }
}

/// Outcome of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// Call succeeded.
    Ok,
    /// Service refused access.
    Denied,
    /// Any other failure.
    Error,
}

impl RemoteOutcome {
    /// Label value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Denied => "denied",
            Self::Error => "error",
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder.
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Handle to the installed Prometheus recorder.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Creates a registry around an installed handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the Prometheus recorder as the global `metrics` recorder.
///
/// Returns `None` when metrics are disabled. The host decides how to expose
/// the rendered text (the cache itself serves nothing).
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if another recorder is installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle.clone());
    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(names::CACHE_LOOKUPS, "Cache lookups by cache and result");
    describe_counter!(
        names::CACHE_EVICTIONS,
        "Entries evicted because a cache reached capacity"
    );
    describe_counter!(
        names::REMOTE_CALLS,
        "Calls to Access Grants, S3 and STS by operation and outcome"
    );
    describe_counter!(
        names::FALLBACKS,
        "Requests signed with the requester's own credentials"
    );
}

/// Records a cache lookup.
pub fn record_cache_lookup(cache: &'static str, result: LookupResult) {
    counter!(names::CACHE_LOOKUPS, "cache" => cache, "result" => result.as_str()).increment(1);
}

/// Records a capacity eviction.
pub fn record_cache_eviction(cache: &'static str) {
    counter!(names::CACHE_EVICTIONS, "cache" => cache).increment(1);
}

/// Records a remote call.
pub fn record_remote_call(operation: &'static str, outcome: RemoteOutcome) {
    counter!(names::REMOTE_CALLS, "operation" => operation, "outcome" => outcome.as_str())
        .increment(1);
}

/// Records a fallback to the requester's credentials.
pub fn record_fallback(reason: &'static str) {
    counter!(names::FALLBACKS, "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert!(MetricsConfig::default().enabled);
    }

    #[test]
    fn test_disabled_metrics() {
        let registry = init_metrics(&MetricsConfig { enabled: false }).unwrap();
        assert!(registry.is_none());
    }

    #[test]
    fn test_label_values() {
        assert_eq!(LookupResult::Hit.as_str(), "hit");
        assert_eq!(LookupResult::Expired.as_str(), "expired");
        assert_eq!(RemoteOutcome::Denied.as_str(), "denied");
    }

    #[test]
    fn test_record_functions_dont_panic() {
        record_cache_lookup("grants", LookupResult::Miss);
        record_cache_eviction("grants");
        record_remote_call("GetDataAccess", RemoteOutcome::Ok);
        record_fallback("unsupported_operation");
    }
}
