//! Credential resolution for a single S3 request.
//!
//! [`AccessGrantsPlugin`] ties the caches to the remote services:
//!
//! ```text
//! S3Request → permission → s3 prefix → CacheKey → denial cache
//!          → caller account → bucket region → regional client → grants cache
//! ```
//!
//! When resolution fails the plugin either reports the error or tells the
//! caller to sign with the requester's own credentials, depending on the
//! fallback policy.

use std::sync::Arc;

use accessgrants_cache::AccessGrantsCaches;
use accessgrants_config::AccessGrantsConfig;
use accessgrants_core::{
    AccessGrantsClient, AccessGrantsClientFactory, AccessGrantsError, AccessGrantsResult,
    BucketProbeClient, CacheKey, Credentials, IdentityClient, RequesterCredentials, ServiceError,
};
use accessgrants_telemetry::metrics::{record_fallback, record_remote_call, RemoteOutcome};
use dashmap::DashMap;
use tracing::debug;

use crate::operation::permission_for_operation;
use crate::request::S3Request;

const GET_CALLER_IDENTITY: &str = "GetCallerIdentity";

/// Credentials to sign a request with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningCredentials {
    /// Credentials vended by Access Grants.
    AccessGrants(Arc<Credentials>),
    /// Keep the requester's own credentials and let bucket policies decide.
    Requester,
}

impl SigningCredentials {
    /// The Access Grants credentials, if any.
    pub fn access_grants(&self) -> Option<&Arc<Credentials>> {
        match self {
            Self::AccessGrants(credentials) => Some(credentials),
            Self::Requester => None,
        }
    }

    /// Whether the request falls back to the requester's credentials.
    pub const fn is_requester(&self) -> bool {
        matches!(self, Self::Requester)
    }
}

/// Resolves Access Grants credentials for S3 requests.
///
/// One plugin serves all requests of a client. Caches are shared behind an
/// `Arc`, so several plugins may also share one set.
#[derive(Debug)]
pub struct AccessGrantsPlugin {
    caches: Arc<AccessGrantsCaches>,
    identity: Arc<dyn IdentityClient>,
    bucket_probe: Arc<dyn BucketProbeClient>,
    client_factory: Arc<dyn AccessGrantsClientFactory>,
    clients: DashMap<String, Arc<dyn AccessGrantsClient>>,
    fallback_enabled: bool,
}

impl AccessGrantsPlugin {
    /// Start building a plugin around the three remote services.
    pub fn builder(
        identity: Arc<dyn IdentityClient>,
        bucket_probe: Arc<dyn BucketProbeClient>,
        client_factory: Arc<dyn AccessGrantsClientFactory>,
    ) -> AccessGrantsPluginBuilder {
        AccessGrantsPluginBuilder {
            identity,
            bucket_probe,
            client_factory,
            caches: None,
            config: AccessGrantsConfig::default(),
        }
    }

    /// Credentials for `request`, from cache or Access Grants.
    ///
    /// A denial recorded in the last five minutes is replayed as
    /// `RemoteDenied` without any remote call.
    pub fn resolve_credentials(
        &self,
        requester: &RequesterCredentials,
        request: &S3Request,
    ) -> AccessGrantsResult<Arc<Credentials>> {
        let permission = permission_for_operation(&request.operation)?;
        let key = CacheKey::new(requester, permission, request.s3_prefix()?)?;

        if let Some(denied) = self.caches.denied.get(&key) {
            debug!(
                s3_prefix = key.s3_prefix(),
                permission = %permission,
                "Found cached access denied response"
            );
            return Err(AccessGrantsError::RemoteDenied(denied));
        }

        let requester_account_id = self.caller_account_id(requester)?;
        let client = self.client_for_bucket(&request.bucket)?;

        self.caches.grants.get_credentials(
            client.as_ref(),
            &key,
            &requester_account_id,
            &self.caches.denied,
        )
    }

    /// Credentials to sign `request` with.
    ///
    /// Errors the fallback policy accepts become
    /// [`SigningCredentials::Requester`]; the rest are returned.
    pub fn signing_credentials(
        &self,
        requester: &RequesterCredentials,
        request: &S3Request,
    ) -> AccessGrantsResult<SigningCredentials> {
        match self.resolve_credentials(requester, request) {
            Ok(credentials) => Ok(SigningCredentials::AccessGrants(credentials)),
            Err(error) if self.should_fallback(&error) => {
                let reason = if error.is_unsupported_operation() {
                    debug!(
                        operation = %request.operation,
                        "Operation not supported by Access Grants, falling back to requester credentials"
                    );
                    "unsupported_operation"
                } else {
                    debug!(
                        operation = %request.operation,
                        error = %error,
                        "Fallback enabled, falling back to requester credentials"
                    );
                    "fallback_enabled"
                };
                record_fallback(reason);
                Ok(SigningCredentials::Requester)
            }
            Err(error) => Err(error),
        }
    }

    /// Whether `error` should be answered with the requester's credentials.
    ///
    /// Unsupported operations always fall back; other errors only when
    /// fallback is enabled.
    pub fn should_fallback(&self, error: &AccessGrantsError) -> bool {
        error.is_unsupported_operation() || self.fallback_enabled
    }

    /// Access Grants client for the region `bucket` lives in.
    ///
    /// Clients are created once per region and reused.
    pub fn client_for_bucket(
        &self,
        bucket: &str,
    ) -> AccessGrantsResult<Arc<dyn AccessGrantsClient>> {
        let region = self
            .caches
            .bucket_regions
            .resolve(self.bucket_probe.as_ref(), bucket)?;

        if let Some(client) = self.clients.get(&region) {
            return Ok(Arc::clone(client.value()));
        }

        debug!(
            bucket,
            region = %region,
            "Creating Access Grants client for region"
        );
        let client = self
            .client_factory
            .client_for_region(&region)
            .map_err(AccessGrantsError::from_service)?;

        // Another thread may have created one meanwhile; keep the first.
        let pooled = self.clients.entry(region).or_insert(client);
        Ok(Arc::clone(pooled.value()))
    }

    /// Whether unresolvable requests fall back to the requester's credentials.
    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    /// The caches this plugin works with.
    pub fn caches(&self) -> &Arc<AccessGrantsCaches> {
        &self.caches
    }

    /// Number of regions with a pooled client.
    pub fn pooled_regions(&self) -> usize {
        self.clients.len()
    }

    fn caller_account_id(&self, requester: &RequesterCredentials) -> AccessGrantsResult<String> {
        let result = self.identity.caller_account_id(requester);
        record_remote_call(GET_CALLER_IDENTITY, outcome_of(&result));
        result.map_err(AccessGrantsError::from_service)
    }
}

fn outcome_of<T>(result: &Result<T, ServiceError>) -> RemoteOutcome {
    match result {
        Ok(_) => RemoteOutcome::Ok,
        Err(error) if error.is_access_denied() => RemoteOutcome::Denied,
        Err(_) => RemoteOutcome::Error,
    }
}

/// Builder for [`AccessGrantsPlugin`].
#[derive(Debug)]
pub struct AccessGrantsPluginBuilder {
    identity: Arc<dyn IdentityClient>,
    bucket_probe: Arc<dyn BucketProbeClient>,
    client_factory: Arc<dyn AccessGrantsClientFactory>,
    caches: Option<Arc<AccessGrantsCaches>>,
    config: AccessGrantsConfig,
}

impl AccessGrantsPluginBuilder {
    /// Take fallback policy and cache settings from `config`.
    #[must_use]
    pub fn config(mut self, config: AccessGrantsConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable fallback to the requester's credentials.
    #[must_use]
    pub fn fallback_enabled(mut self, enabled: bool) -> Self {
        self.config.plugin.fallback_enabled = enabled;
        self
    }

    /// Use existing caches instead of building them from the configuration.
    #[must_use]
    pub fn caches(mut self, caches: Arc<AccessGrantsCaches>) -> Self {
        self.caches = Some(caches);
        self
    }

    /// Build the plugin.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configured cache settings are
    /// out of range.
    pub fn build(self) -> AccessGrantsResult<AccessGrantsPlugin> {
        let caches = match self.caches {
            Some(caches) => caches,
            None => Arc::new(AccessGrantsCaches::new(self.config.cache_settings())?),
        };

        Ok(AccessGrantsPlugin {
            caches,
            identity: self.identity,
            bucket_probe: self.bucket_probe,
            client_factory: self.client_factory,
            clients: DashMap::new(),
            fallback_enabled: self.config.plugin.fallback_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessgrants_core::{DataAccessRequest, DataAccessResponse, HeadBucketResponse};

    #[derive(Debug)]
    struct Unreachable;

    impl IdentityClient for Unreachable {
        fn caller_account_id(&self, _: &RequesterCredentials) -> Result<String, ServiceError> {
            Err(ServiceError::new("Unreachable", "no network in unit tests"))
        }
    }

    impl BucketProbeClient for Unreachable {
        fn head_bucket(&self, _: &str) -> Result<HeadBucketResponse, ServiceError> {
            Err(ServiceError::new("Unreachable", "no network in unit tests"))
        }
    }

    impl AccessGrantsClientFactory for Unreachable {
        fn client_for_region(&self, _: &str) -> Result<Arc<dyn AccessGrantsClient>, ServiceError> {
            Ok(Arc::new(Unreachable))
        }
    }

    impl AccessGrantsClient for Unreachable {
        fn get_access_grants_instance_for_prefix(
            &self,
            _: &str,
            _: &str,
        ) -> Result<String, ServiceError> {
            Err(ServiceError::new("Unreachable", "no network in unit tests"))
        }

        fn get_data_access(
            &self,
            _: &DataAccessRequest,
        ) -> Result<DataAccessResponse, ServiceError> {
            Err(ServiceError::new("Unreachable", "no network in unit tests"))
        }
    }

    fn plugin(fallback_enabled: bool) -> AccessGrantsPlugin {
        let services = Arc::new(Unreachable);
        AccessGrantsPlugin::builder(services.clone(), services.clone(), services)
            .fallback_enabled(fallback_enabled)
            .build()
            .unwrap()
    }

    #[test]
    fn test_unsupported_operation_always_falls_back() {
        let plugin = plugin(false);
        let error = AccessGrantsError::unsupported_operation("CreateBucket");
        assert!(plugin.should_fallback(&error));
    }

    #[test]
    fn test_other_errors_fall_back_only_when_enabled() {
        let error = AccessGrantsError::Remote(ServiceError::new("Throttling", "slow down"));
        assert!(!plugin(false).should_fallback(&error));
        assert!(plugin(true).should_fallback(&error));

        let denied = AccessGrantsError::RemoteDenied(ServiceError::access_denied("no grant"));
        assert!(!plugin(false).should_fallback(&denied));
    }

    #[test]
    fn test_builder_defaults() {
        let services = Arc::new(Unreachable);
        let plugin = AccessGrantsPlugin::builder(services.clone(), services.clone(), services)
            .build()
            .unwrap();
        assert!(plugin.fallback_enabled());
        assert_eq!(plugin.pooled_regions(), 0);
        assert!(plugin.caches().grants.is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_cache_settings() {
        let mut config = AccessGrantsConfig::default();
        config.grants_cache.max_entries = 0;

        let services = Arc::new(Unreachable);
        let result = AccessGrantsPlugin::builder(services.clone(), services.clone(), services)
            .config(config)
            .build();
        assert!(matches!(
            result,
            Err(AccessGrantsError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_signing_credentials_accessors() {
        assert!(SigningCredentials::Requester.is_requester());
        assert!(SigningCredentials::Requester.access_grants().is_none());
    }
}
