//! Error types for Access Grants credential resolution.

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type for credential resolution.
pub type AccessGrantsResult<T> = Result<T, AccessGrantsError>;

/// Error code Access Grants returns when a request is refused.
pub const ACCESS_DENIED_CODE: &str = "AccessDenied";

/// Response header S3 uses to point a redirected caller at the bucket's region.
pub const BUCKET_REGION_HEADER: &str = "x-amz-bucket-region";

/// Error reported by a remote service client.
///
/// Mirrors the shape of an AWS error response: a code, a message, the HTTP
/// status when one was received, and response headers. Cloneable so it can be
/// stored in the access denied cache and replayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    code: String,
    message: String,
    status: Option<u16>,
    headers: BTreeMap<String, String>,
}

impl ServiceError {
    /// Create a service error with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
            headers: BTreeMap::new(),
        }
    }

    /// Create an access denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ACCESS_DENIED_CODE, message).with_status(403)
    }

    /// Set the HTTP status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add a response header. Names are stored lowercased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Error code, e.g. `AccessDenied`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Look up a response header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Region hint carried by a redirect response, if present and non-empty.
    pub fn bucket_region_hint(&self) -> Option<&str> {
        self.header(BUCKET_REGION_HEADER)
            .filter(|region| !region.is_empty())
    }

    /// Whether the service explicitly refused the request.
    pub fn is_access_denied(&self) -> bool {
        self.code == ACCESS_DENIED_CODE
    }
}

/// Errors that can occur while resolving Access Grants credentials.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccessGrantsError {
    /// Cache size or TTL outside the allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Access Grants refused the request.
    #[error("access denied by Access Grants: {0}")]
    RemoteDenied(ServiceError),

    /// Any other failure reported by a remote service.
    #[error("remote call failed: {0}")]
    Remote(ServiceError),

    /// The S3 operation has no Access Grants permission mapping.
    #[error("Access Grants does not support the requested operation: {operation}")]
    UnsupportedOperation {
        /// Operation name as received.
        operation: String,
    },

    /// The request cannot be turned into an Access Grants lookup.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A remote response was missing data the cache relies on.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl AccessGrantsError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create an unsupported operation error.
    pub fn unsupported_operation(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a malformed response error.
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Classify a remote failure as denied or generic.
    pub fn from_service(error: ServiceError) -> Self {
        if error.is_access_denied() {
            Self::RemoteDenied(error)
        } else {
            Self::Remote(error)
        }
    }

    /// Check if Access Grants refused the request.
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::RemoteDenied(_))
    }

    /// Check if the operation is not covered by Access Grants.
    pub const fn is_unsupported_operation(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// The underlying service error, for remote failures.
    pub const fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::RemoteDenied(error) | Self::Remote(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ServiceError> for AccessGrantsError {
    fn from(error: ServiceError) -> Self {
        Self::from_service(error)
    }
}
