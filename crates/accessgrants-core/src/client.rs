//! Remote service interfaces consumed by the cache.
//!
//! The cache never talks to the network itself. Hosts implement these traits
//! on top of their S3, S3 Control and STS clients; tests implement them with
//! in-memory mocks. All calls are blocking and run on the caller's thread.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::credentials::{Credentials, RequesterCredentials};
use crate::error::ServiceError;
use crate::permission::{Permission, Privilege};

/// Parameters of a `GetDataAccess` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAccessRequest {
    /// Account owning the Access Grants instance.
    pub account_id: String,
    /// Requested target, e.g. `s3://bucket/prefix`.
    pub target: String,
    /// Requested permission.
    pub permission: Permission,
    /// Grant evaluation mode.
    pub privilege: Privilege,
    /// Requested lifetime of the vended credentials.
    pub duration: Duration,
}

/// Result of a `GetDataAccess` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAccessResponse {
    /// Vended credentials.
    pub credentials: Credentials,
    /// Scope of the grant that matched, e.g. `s3://bucket/prefix/*`.
    pub matched_grant_target: String,
}

/// Result of a `HeadBucket` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadBucketResponse {
    /// Region the bucket lives in.
    pub bucket_region: String,
}

/// Access Grants control-plane client (S3 Control).
pub trait AccessGrantsClient: Send + Sync + Debug {
    /// Returns the ARN of the Access Grants instance that owns `s3_prefix`.
    fn get_access_grants_instance_for_prefix(
        &self,
        account_id: &str,
        s3_prefix: &str,
    ) -> Result<String, ServiceError>;

    /// Vends temporary credentials for a target.
    fn get_data_access(&self, request: &DataAccessRequest)
        -> Result<DataAccessResponse, ServiceError>;
}

/// S3 client used to locate a bucket's region.
pub trait BucketProbeClient: Send + Sync + Debug {
    /// Lightweight existence check for a bucket.
    ///
    /// Redirect failures should carry the `x-amz-bucket-region` header.
    fn head_bucket(&self, bucket: &str) -> Result<HeadBucketResponse, ServiceError>;
}

/// Resolves the account id of the requester (STS `GetCallerIdentity`).
pub trait IdentityClient: Send + Sync + Debug {
    /// Account id the requester's credentials belong to.
    fn caller_account_id(&self, requester: &RequesterCredentials) -> Result<String, ServiceError>;
}

/// Builds region-scoped Access Grants clients.
pub trait AccessGrantsClientFactory: Send + Sync + Debug {
    /// Client talking to the S3 Control endpoint of `region`.
    fn client_for_region(&self, region: &str) -> Result<Arc<dyn AccessGrantsClient>, ServiceError>;
}
