//! Core types for the S3 Access Grants credential cache.
//!
//! This crate holds the value types and collaborator traits shared by the
//! cache, configuration and plugin crates:
//!
//! - [`Permission`] and [`Privilege`] - the grant parameters sent to Access Grants
//! - [`RequesterCredentials`] and [`Identity`] - who is asking
//! - [`CacheKey`] - the `(identity, permission, s3 prefix)` lookup key
//! - [`Credentials`] - temporary credentials vended by Access Grants
//! - [`AccessGrantsError`] and [`ServiceError`] - the error taxonomy
//! - [`AccessGrantsClient`], [`BucketProbeClient`], [`IdentityClient`] and
//!   [`AccessGrantsClientFactory`] - the remote services, consumed as traits
//!
//! # Example
//!
//! ```
//! use accessgrants_core::{CacheKey, Permission, RequesterCredentials};
//!
//! let requester = RequesterCredentials::new("AKIDEXAMPLE", "secret").with_session_token("t1");
//! let key = CacheKey::new(&requester, Permission::Read, "s3://bucket/prefix").unwrap();
//!
//! // Rotating the session token does not change the key.
//! let rotated = RequesterCredentials::new("AKIDEXAMPLE", "secret").with_session_token("t2");
//! assert_eq!(key, CacheKey::new(&rotated, Permission::Read, "s3://bucket/prefix").unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod credentials;
pub mod error;
pub mod key;
pub mod permission;

pub use client::{
    AccessGrantsClient, AccessGrantsClientFactory, BucketProbeClient, DataAccessRequest,
    DataAccessResponse, HeadBucketResponse, IdentityClient,
};
pub use credentials::{Credentials, Identity, RequesterCredentials};
pub use error::{AccessGrantsError, AccessGrantsResult, ServiceError};
pub use key::CacheKey;
pub use permission::{Permission, Privilege};
