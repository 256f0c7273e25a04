//! Composite cache key.

use std::sync::Arc;

use crate::credentials::{Identity, RequesterCredentials};
use crate::error::{AccessGrantsError, AccessGrantsResult};
use crate::permission::Permission;

/// Key identifying a cached grant: `(identity, permission, s3 prefix)`.
///
/// Keys are immutable. Probing a broader prefix or an upgraded permission
/// derives a new key with [`with_prefix`](Self::with_prefix) or
/// [`with_permission`](Self::with_permission) without rebuilding the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    identity: Identity,
    permission: Permission,
    s3_prefix: Arc<str>,
}

impl CacheKey {
    /// Build a key for a requester.
    ///
    /// Fails with [`AccessGrantsError::InvalidRequest`] when the prefix or the
    /// requester's access key id is empty.
    pub fn new(
        requester: &RequesterCredentials,
        permission: Permission,
        s3_prefix: impl Into<String>,
    ) -> AccessGrantsResult<Self> {
        if requester.access_key_id().is_empty() {
            return Err(AccessGrantsError::invalid_request(
                "requester access key id must be provided",
            ));
        }
        Self::from_identity(requester.identity(), permission, s3_prefix)
    }

    /// Build a key from an already extracted identity.
    pub fn from_identity(
        identity: Identity,
        permission: Permission,
        s3_prefix: impl Into<String>,
    ) -> AccessGrantsResult<Self> {
        let s3_prefix = s3_prefix.into();
        if s3_prefix.is_empty() {
            return Err(AccessGrantsError::invalid_request("s3 prefix must be provided"));
        }
        Ok(Self {
            identity,
            permission,
            s3_prefix: Arc::from(s3_prefix),
        })
    }

    /// Same identity and prefix, different permission.
    pub fn with_permission(&self, permission: Permission) -> Self {
        Self {
            identity: self.identity.clone(),
            permission,
            s3_prefix: Arc::clone(&self.s3_prefix),
        }
    }

    /// Same identity and permission, different prefix.
    pub fn with_prefix(&self, s3_prefix: &str) -> Self {
        Self {
            identity: self.identity.clone(),
            permission: self.permission,
            s3_prefix: Arc::from(s3_prefix),
        }
    }

    /// Requester identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Requested permission.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Target prefix, e.g. `s3://bucket/prefix`.
    pub fn s3_prefix(&self) -> &str {
        &self.s3_prefix
    }
}
