//! Negative cache of access denied responses.

use accessgrants_core::{AccessGrantsResult, CacheKey, ServiceError};
use tracing::debug;

use crate::config::{CacheConfig, ACCESS_DENIED_CACHE_TTL};
use crate::ttl::{BoundedTtlCache, CacheStats};

const CACHE_NAME: &str = "access_denied";

/// Remembers recent access denied responses so they can be replayed without
/// calling Access Grants again.
///
/// Entries live for 5 minutes; at most 3000 are kept.
#[derive(Debug)]
pub struct AccessDeniedCache {
    cache: BoundedTtlCache<CacheKey, ServiceError>,
}

impl AccessDeniedCache {
    /// Create the cache with its fixed size and TTL.
    pub fn new() -> AccessGrantsResult<Self> {
        Ok(Self {
            cache: BoundedTtlCache::new(
                CACHE_NAME,
                CacheConfig::access_denied(),
                ACCESS_DENIED_CACHE_TTL,
            )?,
        })
    }

    /// Record a denial for `key`.
    pub fn put(&self, key: CacheKey, error: ServiceError) {
        debug!(
            s3_prefix = key.s3_prefix(),
            permission = %key.permission(),
            "Caching access denied response"
        );
        self.cache.insert(key, error);
    }

    /// Recorded denial for `key`, if still live.
    pub fn get(&self, key: &CacheKey) -> Option<ServiceError> {
        self.cache.get(key)
    }

    /// Number of stored denials.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no denial is stored.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessgrants_core::{Permission, RequesterCredentials};

    fn key(prefix: &str) -> CacheKey {
        let requester = RequesterCredentials::new("AKID", "secret");
        CacheKey::new(&requester, Permission::Read, prefix).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let cache = AccessDeniedCache::new().unwrap();
        let error = ServiceError::access_denied("no grant");

        cache.put(key("s3://bucket/a"), error.clone());

        let cached = cache.get(&key("s3://bucket/a")).unwrap();
        assert_eq!(cached.code(), error.code());
        assert_eq!(cached.message(), "no grant");
        assert!(cache.get(&key("s3://bucket/b")).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lookup_ignores_session_token() {
        let cache = AccessDeniedCache::new().unwrap();
        let with_token = RequesterCredentials::new("AKID", "secret").with_session_token("t1");
        let key_with_token = CacheKey::new(&with_token, Permission::Write, "s3://b/p").unwrap();
        cache.put(key_with_token, ServiceError::access_denied("denied"));

        let rotated = RequesterCredentials::new("AKID", "secret").with_session_token("t2");
        let lookup = CacheKey::new(&rotated, Permission::Write, "s3://b/p").unwrap();
        assert!(cache.get(&lookup).is_some());
        let read = lookup.with_permission(Permission::Read);
        assert!(cache.get(&read).is_none());
    }
}
