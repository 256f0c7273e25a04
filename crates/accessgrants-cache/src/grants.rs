//! Prefix-aware credentials cache.
//!
//! Credentials vended for a prefix grant serve every request beneath that
//! prefix, so a lookup probes the whole prefix hierarchy of the requested
//! target before calling Access Grants:
//!
//! 1. directory candidates with the requested permission
//! 2. directory candidates with `READWRITE`, for `READ` and `WRITE` requests
//! 3. character candidates with the requested permission
//! 4. character candidates with `READWRITE`, for `READ` and `WRITE` requests
//! 5. `GetDataAccess`, caching the result under its matched grant target
//!
//! Object-level grants (targets without a trailing `*`) are never cached.

use std::sync::Arc;
use std::time::Duration;

use accessgrants_core::{
    AccessGrantsClient, AccessGrantsError, AccessGrantsResult, CacheKey, Credentials,
    DataAccessRequest, DataAccessResponse, Privilege,
};
use tracing::debug;

use crate::account::AccountIdResolver;
use crate::config::{GrantsCacheConfig, MAX_CREDENTIALS_DURATION};
use crate::denied::AccessDeniedCache;
use crate::prefix::{
    character_candidates, directory_candidates, is_prefix_grant, normalize_grant_target,
};
use crate::remote::{self, GET_DATA_ACCESS};
use crate::ttl::{BoundedTtlCache, CacheStats};

const CACHE_NAME: &str = "grants";

/// Cache of credentials vended by Access Grants, keyed by grant scope.
#[derive(Debug)]
pub struct AccessGrantsCache {
    cache: BoundedTtlCache<CacheKey, Arc<Credentials>>,
    duration: Duration,
    account_ids: Arc<AccountIdResolver>,
}

impl AccessGrantsCache {
    /// Create a grants cache.
    ///
    /// Entries live for 90% of `config.duration` so cached credentials are
    /// replaced before they expire.
    pub fn new(
        config: GrantsCacheConfig,
        account_ids: Arc<AccountIdResolver>,
    ) -> AccessGrantsResult<Self> {
        config.validate()?;
        let cache = BoundedTtlCache::new(
            CACHE_NAME,
            config.cache_config(),
            MAX_CREDENTIALS_DURATION,
        )?;
        Ok(Self {
            cache,
            duration: config.duration,
            account_ids,
        })
    }

    /// Credentials for `key`, from cache or from Access Grants.
    ///
    /// A denial from Access Grants is recorded in `denied` before the error
    /// is returned. Other failures are returned without caching anything.
    pub fn get_credentials(
        &self,
        client: &dyn AccessGrantsClient,
        key: &CacheKey,
        requester_account_id: &str,
        denied: &AccessDeniedCache,
    ) -> AccessGrantsResult<Arc<Credentials>> {
        debug!(
            s3_prefix = key.s3_prefix(),
            permission = %key.permission(),
            "Looking up Access Grants credentials"
        );

        if let Some(credentials) = self.search_cached(key) {
            return Ok(credentials);
        }

        debug!(
            s3_prefix = key.s3_prefix(),
            "Credentials not available in cache, fetching from Access Grants"
        );
        match self.fetch(client, key, requester_account_id) {
            Ok(response) => Ok(self.store(key, response)),
            Err(error) => {
                debug!(
                    s3_prefix = key.s3_prefix(),
                    error = %error,
                    "Fetching credentials failed"
                );
                if let AccessGrantsError::RemoteDenied(service_error) = &error {
                    denied.put(key.clone(), service_error.clone());
                }
                Err(error)
            }
        }
    }

    /// Cache `credentials` under the exact scope of `key`.
    pub fn insert(&self, key: CacheKey, credentials: Arc<Credentials>) {
        self.cache.insert(key, credentials);
    }

    /// Credentials cached under the exact scope of `key`, without any
    /// hierarchy search.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Credentials>> {
        self.cache.get(key)
    }

    /// Credential lifetime requested from Access Grants.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Number of cached grants.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no grant is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache statistics. Every probed candidate counts as one lookup.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn search_cached(&self, key: &CacheKey) -> Option<Arc<Credentials>> {
        let upgraded = key.permission().upgraded().map(|p| key.with_permission(p));

        self.search_prefix_level(key)
            .or_else(|| upgraded.as_ref().and_then(|k| self.search_prefix_level(k)))
            .or_else(|| self.search_character_level(key))
            .or_else(|| upgraded.as_ref().and_then(|k| self.search_character_level(k)))
    }

    /// Search directory grants (`s3://bucket/prefix/*`).
    pub(crate) fn search_prefix_level(&self, key: &CacheKey) -> Option<Arc<Credentials>> {
        directory_candidates(key.s3_prefix()).find_map(|candidate| {
            let credentials = self.cache.get(&key.with_prefix(candidate))?;
            debug!(
                s3_prefix = candidate,
                permission = %key.permission(),
                "Found credentials for directory grant in cache"
            );
            Some(credentials)
        })
    }

    /// Search character grants (`s3://bucket/prefix*`).
    pub(crate) fn search_character_level(&self, key: &CacheKey) -> Option<Arc<Credentials>> {
        character_candidates(key.s3_prefix()).find_map(|candidate| {
            let credentials = self.cache.get(&key.with_prefix(&candidate))?;
            debug!(
                s3_prefix = %candidate,
                permission = %key.permission(),
                "Found credentials for character grant in cache"
            );
            Some(credentials)
        })
    }

    fn fetch(
        &self,
        client: &dyn AccessGrantsClient,
        key: &CacheKey,
        requester_account_id: &str,
    ) -> AccessGrantsResult<DataAccessResponse> {
        let account_id = self
            .account_ids
            .resolve(client, requester_account_id, key.s3_prefix())?;

        debug!(
            account_id = %account_id,
            s3_prefix = key.s3_prefix(),
            permission = %key.permission(),
            privilege = %Privilege::Default,
            "Fetching credentials from Access Grants"
        );
        let request = DataAccessRequest {
            account_id,
            target: key.s3_prefix().to_string(),
            permission: key.permission(),
            privilege: Privilege::Default,
            duration: self.duration,
        };
        remote::observe(GET_DATA_ACCESS, client.get_data_access(&request))
            .map_err(AccessGrantsError::from_service)
    }

    fn store(&self, key: &CacheKey, response: DataAccessResponse) -> Arc<Credentials> {
        let credentials = Arc::new(response.credentials);
        let matched = response.matched_grant_target.as_str();

        if is_prefix_grant(matched) {
            let scope = normalize_grant_target(matched);
            debug!(
                matched_grant_target = matched,
                s3_prefix = scope,
                permission = %key.permission(),
                "Caching credentials for prefix grant"
            );
            self.cache
                .insert(key.with_prefix(scope), Arc::clone(&credentials));
        } else {
            debug!(
                matched_grant_target = matched,
                "Not caching credentials for object grant"
            );
        }
        credentials
    }
}
