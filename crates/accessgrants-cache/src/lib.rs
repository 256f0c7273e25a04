//! Credential, denial and resolver caches for S3 Access Grants.
//!
//! The caches sit between an S3 client and the Access Grants service. A
//! request for `(requester, permission, s3 prefix)` is served from the
//! [`AccessGrantsCache`] when any cached grant covers the prefix, and only
//! reaches `GetDataAccess` on a miss.
//!
//! ```text
//! request ──► AccessDeniedCache ──► AccessGrantsCache ──► GetDataAccess
//!                                        │
//!                                        └─► AccountIdResolver ──► GetAccessGrantsInstanceForPrefix
//! ```
//!
//! The [`BucketRegionResolver`] picks the regional Access Grants endpoint.
//! All caches are [`BoundedTtlCache`]s: LRU-bounded, TTL-expiring and safe to
//! share between threads.
//!
//! # Example
//!
//! ```
//! use accessgrants_cache::{AccessGrantsCaches, CacheSettings};
//!
//! let caches = AccessGrantsCaches::new(CacheSettings::default()).unwrap();
//! assert!(caches.grants.is_empty());
//! assert_eq!(caches.grants.ttl().as_secs(), 3240);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod config;
pub mod denied;
pub mod grants;
pub mod prefix;
mod remote;
pub mod region;
pub mod ttl;

use std::sync::Arc;

use accessgrants_core::AccessGrantsResult;

pub use account::AccountIdResolver;
pub use config::{CacheConfig, GrantsCacheConfig};
pub use denied::AccessDeniedCache;
pub use grants::AccessGrantsCache;
pub use region::BucketRegionResolver;
pub use ttl::{BoundedTtlCache, CacheStats};

/// Settings for every cache in an [`AccessGrantsCaches`] bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Grants cache size and credential lifetime.
    pub grants: GrantsCacheConfig,
    /// Bucket-to-account cache.
    pub account_id: CacheConfig,
    /// Bucket-to-region cache.
    pub bucket_region: CacheConfig,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            grants: GrantsCacheConfig::default(),
            account_id: CacheConfig::account_id(),
            bucket_region: CacheConfig::bucket_region(),
        }
    }
}

/// The caches one plugin instance works with.
///
/// Built once and shared (typically behind an `Arc`) by every request the
/// plugin handles.
#[derive(Debug)]
pub struct AccessGrantsCaches {
    /// Credentials by grant scope.
    pub grants: AccessGrantsCache,
    /// Recent access denied responses.
    pub denied: AccessDeniedCache,
    /// Bucket owner accounts; also used by `grants`.
    pub account_ids: Arc<AccountIdResolver>,
    /// Bucket regions.
    pub bucket_regions: BucketRegionResolver,
}

impl AccessGrantsCaches {
    /// Build all caches, failing on the first invalid setting.
    pub fn new(settings: CacheSettings) -> AccessGrantsResult<Self> {
        let account_ids = Arc::new(AccountIdResolver::new(settings.account_id)?);
        Ok(Self {
            grants: AccessGrantsCache::new(settings.grants, Arc::clone(&account_ids))?,
            denied: AccessDeniedCache::new()?,
            account_ids,
            bucket_regions: BucketRegionResolver::new(settings.bucket_region)?,
        })
    }
}
