//! Cache sizing and expiry configuration.

use std::time::Duration;

use accessgrants_core::{AccessGrantsError, AccessGrantsResult};

/// Largest number of entries any cache may hold.
pub const MAX_CACHE_ENTRIES: usize = 1_000_000;

/// Longest credential lifetime that may be requested from Access Grants.
pub const MAX_CREDENTIALS_DURATION: Duration = Duration::from_secs(12 * 60 * 60);

/// Longest TTL for the account id and bucket region resolver caches.
pub const MAX_RESOLVER_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Share of the credential lifetime for which a grant stays cached, in percent.
///
/// Cached credentials are refreshed before they actually expire.
pub const CACHE_EXPIRATION_PERCENTAGE: u32 = 90;

/// Default number of cached grants.
pub const DEFAULT_GRANTS_CACHE_SIZE: usize = 30_000;

/// Default credential lifetime requested from Access Grants.
pub const DEFAULT_CREDENTIALS_DURATION: Duration = Duration::from_secs(60 * 60);

/// Default number of cached bucket-to-account mappings.
pub const DEFAULT_ACCOUNT_ID_CACHE_SIZE: usize = 1_000;

/// Default TTL of bucket-to-account mappings.
pub const DEFAULT_ACCOUNT_ID_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Default number of cached bucket-to-region mappings.
pub const DEFAULT_BUCKET_REGION_CACHE_SIZE: usize = 1_000;

/// Default TTL of bucket-to-region mappings.
pub const DEFAULT_BUCKET_REGION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Number of remembered access denied responses.
pub const ACCESS_DENIED_CACHE_SIZE: usize = 3_000;

/// How long an access denied response is replayed.
pub const ACCESS_DENIED_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Capacity and TTL of a single bounded cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries.
    pub max_entries: usize,
    /// Time after which an entry is treated as absent.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Create a cache configuration.
    pub const fn new(max_entries: usize, ttl: Duration) -> Self {
        Self { max_entries, ttl }
    }

    /// Defaults for the bucket-to-account resolver.
    pub const fn account_id() -> Self {
        Self::new(DEFAULT_ACCOUNT_ID_CACHE_SIZE, DEFAULT_ACCOUNT_ID_CACHE_TTL)
    }

    /// Defaults for the bucket-to-region resolver.
    pub const fn bucket_region() -> Self {
        Self::new(
            DEFAULT_BUCKET_REGION_CACHE_SIZE,
            DEFAULT_BUCKET_REGION_CACHE_TTL,
        )
    }

    /// Fixed settings of the access denied cache.
    pub const fn access_denied() -> Self {
        Self::new(ACCESS_DENIED_CACHE_SIZE, ACCESS_DENIED_CACHE_TTL)
    }

    /// Check `0 < max_entries <= MAX_CACHE_ENTRIES` and `0 < ttl <= max_ttl`.
    pub fn validate(&self, max_ttl: Duration) -> AccessGrantsResult<()> {
        if self.max_entries == 0 || self.max_entries > MAX_CACHE_ENTRIES {
            return Err(AccessGrantsError::invalid_configuration(format!(
                "cache size must be between 1 and {MAX_CACHE_ENTRIES}, got {}",
                self.max_entries
            )));
        }
        if self.ttl.is_zero() || self.ttl > max_ttl {
            return Err(AccessGrantsError::invalid_configuration(format!(
                "cache ttl must be greater than 0 and at most {}s, got {:?}",
                max_ttl.as_secs(),
                self.ttl
            )));
        }
        Ok(())
    }
}

/// Configuration of the grants (credentials) cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantsCacheConfig {
    /// Maximum number of cached grants.
    pub max_entries: usize,
    /// Credential lifetime requested from Access Grants.
    pub duration: Duration,
}

impl Default for GrantsCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_GRANTS_CACHE_SIZE,
            duration: DEFAULT_CREDENTIALS_DURATION,
        }
    }
}

impl GrantsCacheConfig {
    /// Create a grants cache configuration.
    pub const fn new(max_entries: usize, duration: Duration) -> Self {
        Self {
            max_entries,
            duration,
        }
    }

    /// Set the maximum number of cached grants.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the requested credential lifetime.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// TTL of cached grants: 90% of the credential lifetime.
    pub fn cache_ttl(&self) -> Duration {
        self.duration * CACHE_EXPIRATION_PERCENTAGE / 100
    }

    /// Check the size and duration limits.
    pub fn validate(&self) -> AccessGrantsResult<()> {
        if self.max_entries == 0 || self.max_entries > MAX_CACHE_ENTRIES {
            return Err(AccessGrantsError::invalid_configuration(format!(
                "max cache size should be between 1 and {MAX_CACHE_ENTRIES}, got {}",
                self.max_entries
            )));
        }
        if self.duration.is_zero() || self.duration > MAX_CREDENTIALS_DURATION {
            return Err(AccessGrantsError::invalid_configuration(format!(
                "credentials duration should be greater than 0 and at most {}s, got {:?}",
                MAX_CREDENTIALS_DURATION.as_secs(),
                self.duration
            )));
        }
        Ok(())
    }

    /// Settings of the underlying bounded cache.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.max_entries, self.cache_ttl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CacheConfig::account_id().validate(MAX_RESOLVER_TTL).is_ok());
        assert!(CacheConfig::bucket_region()
            .validate(MAX_RESOLVER_TTL)
            .is_ok());
        assert!(CacheConfig::access_denied()
            .validate(ACCESS_DENIED_CACHE_TTL)
            .is_ok());
        assert!(GrantsCacheConfig::default().validate().is_ok());
    }

    #[test]
    fn test_size_limits() {
        let too_big = CacheConfig::new(MAX_CACHE_ENTRIES + 1, Duration::from_secs(60));
        assert!(too_big.validate(MAX_RESOLVER_TTL).is_err());

        let empty = CacheConfig::new(0, Duration::from_secs(60));
        assert!(empty.validate(MAX_RESOLVER_TTL).is_err());

        let largest = CacheConfig::new(MAX_CACHE_ENTRIES, Duration::from_secs(60));
        assert!(largest.validate(MAX_RESOLVER_TTL).is_ok());
    }

    #[test]
    fn test_ttl_limits() {
        let zero = CacheConfig::new(10, Duration::ZERO);
        assert!(zero.validate(MAX_RESOLVER_TTL).is_err());

        let too_long = CacheConfig::new(10, MAX_RESOLVER_TTL + Duration::from_secs(1));
        assert!(matches!(
            too_long.validate(MAX_RESOLVER_TTL),
            Err(AccessGrantsError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_grants_ttl_is_ninety_percent() {
        let config = GrantsCacheConfig::default().with_duration(Duration::from_secs(100));
        assert_eq!(config.cache_ttl(), Duration::from_secs(90));
        assert_eq!(config.cache_config().ttl, Duration::from_secs(90));
    }

    #[test]
    fn test_grants_limits() {
        assert!(GrantsCacheConfig::default()
            .with_max_entries(1_000_001)
            .validate()
            .is_err());
        assert!(GrantsCacheConfig::default()
            .with_duration(Duration::from_secs(4_099_000))
            .validate()
            .is_err());
        assert!(GrantsCacheConfig::default()
            .with_duration(MAX_CREDENTIALS_DURATION)
            .validate()
            .is_ok());
    }
}
