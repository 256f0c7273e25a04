//! Bucket region resolution.

use accessgrants_core::{AccessGrantsError, AccessGrantsResult, BucketProbeClient};
use tracing::debug;

use crate::config::{CacheConfig, MAX_RESOLVER_TTL};
use crate::remote::{self, HEAD_BUCKET};
use crate::ttl::{BoundedTtlCache, CacheStats};

const CACHE_NAME: &str = "bucket_region";

/// Maps buckets to the region they live in.
///
/// Access Grants must be called in the bucket's region.
#[derive(Debug)]
pub struct BucketRegionResolver {
    cache: BoundedTtlCache<String, String>,
}

impl BucketRegionResolver {
    /// Create a resolver. The TTL may be at most 30 days.
    pub fn new(config: CacheConfig) -> AccessGrantsResult<Self> {
        Ok(Self {
            cache: BoundedTtlCache::new(CACHE_NAME, config, MAX_RESOLVER_TTL)?,
        })
    }

    /// Create a resolver with 1000 entries and a 5 minute TTL.
    pub fn with_defaults() -> AccessGrantsResult<Self> {
        Self::new(CacheConfig::bucket_region())
    }

    /// Region of `bucket`.
    ///
    /// On a miss, calls `HeadBucket`. A failed call still resolves when it
    /// carries an `x-amz-bucket-region` header, which S3 sends on redirects.
    /// A successful call without a region is a `MalformedResponse`.
    pub fn resolve(
        &self,
        client: &dyn BucketProbeClient,
        bucket: &str,
    ) -> AccessGrantsResult<String> {
        let key = bucket.to_string();
        if let Some(region) = self.cache.get(&key) {
            return Ok(region);
        }

        debug!(
            bucket,
            "Region not available in cache, fetching from service"
        );
        let region = match remote::observe(HEAD_BUCKET, client.head_bucket(bucket)) {
            Ok(response) if response.bucket_region.is_empty() => {
                return Err(AccessGrantsError::malformed_response(format!(
                    "HeadBucket returned no region for bucket {bucket}"
                )));
            }
            Ok(response) => response.bucket_region,
            Err(error) => match error.bucket_region_hint() {
                Some(region) => {
                    debug!(
                        bucket,
                        region,
                        error = %error,
                        "HeadBucket failed, using region from response headers"
                    );
                    region.to_string()
                }
                None => return Err(AccessGrantsError::Remote(error)),
            },
        };

        self.cache.insert(key, region.clone());
        Ok(region)
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
