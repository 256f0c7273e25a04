//! Bucket owner account resolution.

use accessgrants_core::{AccessGrantsClient, AccessGrantsError, AccessGrantsResult};
use tracing::debug;

use crate::config::{CacheConfig, MAX_RESOLVER_TTL};
use crate::remote::{self, GET_INSTANCE_FOR_PREFIX};
use crate::ttl::{BoundedTtlCache, CacheStats};

const CACHE_NAME: &str = "account_id";

/// Index of the account id in a colon-delimited ARN.
const ARN_ACCOUNT_FIELD: usize = 4;

/// Index of the bucket in a `/`-delimited `s3://bucket/...` prefix.
const PREFIX_BUCKET_FIELD: usize = 2;

/// Maps buckets to the account owning their Access Grants instance.
///
/// `GetDataAccess` has to be sent to the bucket owner's instance, which is
/// not necessarily the requester's account.
#[derive(Debug)]
pub struct AccountIdResolver {
    cache: BoundedTtlCache<String, String>,
}

impl AccountIdResolver {
    /// Create a resolver. The TTL may be at most 30 days.
    pub fn new(config: CacheConfig) -> AccessGrantsResult<Self> {
        Ok(Self {
            cache: BoundedTtlCache::new(CACHE_NAME, config, MAX_RESOLVER_TTL)?,
        })
    }

    /// Create a resolver with 1000 entries and a 1 hour TTL.
    pub fn with_defaults() -> AccessGrantsResult<Self> {
        Self::new(CacheConfig::account_id())
    }

    /// Account id owning the Access Grants instance for `s3_prefix`.
    ///
    /// Served from cache by bucket name; on a miss, asks
    /// `GetAccessGrantsInstanceForPrefix` on behalf of `requester_account_id`.
    pub fn resolve(
        &self,
        client: &dyn AccessGrantsClient,
        requester_account_id: &str,
        s3_prefix: &str,
    ) -> AccessGrantsResult<String> {
        let bucket = bucket_name(s3_prefix)?;
        if let Some(account_id) = self.cache.get(&bucket.to_string()) {
            return Ok(account_id);
        }

        debug!(
            bucket,
            s3_prefix, "Account id not available in cache, fetching from Access Grants"
        );
        let arn = remote::observe(
            GET_INSTANCE_FOR_PREFIX,
            client.get_access_grants_instance_for_prefix(requester_account_id, s3_prefix),
        )
        .map_err(AccessGrantsError::from_service)?;

        let account_id = account_id_from_arn(&arn)?.to_string();
        self.cache.insert(bucket.to_string(), account_id.clone());
        debug!(bucket, account_id = %account_id, "Resolved bucket owner account");
        Ok(account_id)
    }

    /// Number of cached buckets.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no bucket is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Bucket name of an `s3://bucket/...` prefix.
pub fn bucket_name(s3_prefix: &str) -> AccessGrantsResult<&str> {
    s3_prefix
        .split('/')
        .nth(PREFIX_BUCKET_FIELD)
        .filter(|bucket| !bucket.is_empty())
        .ok_or_else(|| {
            AccessGrantsError::invalid_request(format!(
                "s3 prefix {s3_prefix:?} does not name a bucket"
            ))
        })
}

fn account_id_from_arn(arn: &str) -> AccessGrantsResult<&str> {
    arn.split(':')
        .nth(ARN_ACCOUNT_FIELD)
        .filter(|account| !account.is_empty())
        .ok_or_else(|| {
            AccessGrantsError::malformed_response(format!(
                "Access Grants instance ARN {arn:?} has no account id"
            ))
        })
}
