//! Requester identities and vended credentials.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const REDACTED: &str = "<redacted>";

/// Credentials of the principal making the S3 request.
#[derive(Clone, PartialEq, Eq)]
pub struct RequesterCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl RequesterCredentials {
    /// Create long-term requester credentials.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Access key id.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// The cache identity of these credentials (the token is not part of it).
    pub fn identity(&self) -> Identity {
        Identity {
            inner: Arc::new(IdentityInner {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
            }),
        }
    }
}

impl fmt::Debug for RequesterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequesterCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &REDACTED)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| REDACTED),
            )
            .finish()
    }
}

#[derive(PartialEq, Eq, Hash)]
struct IdentityInner {
    access_key_id: String,
    secret_access_key: String,
}

/// Cache identity of a requester: the access key id and secret key pair.
///
/// Session tokens rotate on every refresh, so they are deliberately excluded;
/// equality and hashing only look at the key pair. Cloning is cheap.
#[derive(Clone)]
pub struct Identity {
    inner: Arc<IdentityInner>,
}

impl Identity {
    /// Access key id of this identity.
    pub fn access_key_id(&self) -> &str {
        &self.inner.access_key_id
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("access_key_id", &self.inner.access_key_id)
            .field("secret_access_key", &REDACTED)
            .finish()
    }
}

/// Temporary credentials returned by `GetDataAccess`.
///
/// Passed through unchanged from the service and shared as `Arc<Credentials>`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    /// Temporary access key id.
    pub access_key_id: String,
    /// Temporary secret access key.
    pub secret_access_key: String,
    /// Session token bound to the temporary keys.
    pub session_token: String,
    /// When the credentials stop working.
    pub expiration: DateTime<Utc>,
}

impl Credentials {
    /// Create a credentials value.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            expiration,
        }
    }

    /// Whether the credentials have expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &REDACTED)
            .field("session_token", &REDACTED)
            .field("expiration", &self.expiration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_identity_ignores_session_token() {
        let a = RequesterCredentials::new("AKID", "secret").with_session_token("one");
        let b = RequesterCredentials::new("AKID", "secret").with_session_token("two");
        assert_eq!(a.identity(), b.identity());
        assert_eq!(hash_of(&a.identity()), hash_of(&b.identity()));
    }

    #[test]
    fn test_identity_distinguishes_secret() {
        let a = RequesterCredentials::new("AKID", "secret-a");
        let b = RequesterCredentials::new("AKID", "secret-b");
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let requester = RequesterCredentials::new("AKID", "top-secret").with_session_token("tok");
        let rendered = format!("{requester:?} {:?}", requester.identity());
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("\"tok\""));

        let vended = Credentials::new(
            "ASIA",
            "vended-secret",
            "vended-token",
            Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap(),
        );
        let rendered = format!("{vended:?}");
        assert!(!rendered.contains("vended-secret"));
        assert!(!rendered.contains("vended-token"));
    }

    #[test]
    fn test_expiration() {
        let expiry = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let creds = Credentials::new("a", "b", "c", expiry);
        assert!(creds.is_expired_at(expiry));
        let before = Utc.with_ymd_and_hms(2014, 12, 31, 0, 0, 0).unwrap();
        assert!(!creds.is_expired_at(before));
    }
}
