//! Grant permissions and privileges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AccessGrantsError;

/// Permission level requested from (or granted by) Access Grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    /// Read-only access.
    Read,
    /// Write-only access.
    Write,
    /// Read and write access.
    ReadWrite,
}

impl Permission {
    /// Wire name of the permission.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadWrite => "READWRITE",
        }
    }

    /// The broader permission whose grants also satisfy this one.
    ///
    /// A `READWRITE` grant covers both `READ` and `WRITE` requests. `READ` and
    /// `WRITE` never cover each other, and nothing is broader than `READWRITE`.
    pub const fn upgraded(&self) -> Option<Self> {
        match self {
            Self::Read | Self::Write => Some(Self::ReadWrite),
            Self::ReadWrite => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AccessGrantsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "READ" => Ok(Self::Read),
            "WRITE" => Ok(Self::Write),
            "READWRITE" => Ok(Self::ReadWrite),
            other => Err(AccessGrantsError::invalid_request(format!(
                "unknown permission: {other}"
            ))),
        }
    }
}

/// Grant evaluation mode passed through to `GetDataAccess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Privilege {
    /// Credentials scoped to the matched grant.
    #[default]
    Default,
}

impl Privilege {
    /// Wire name of the privilege.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "Default",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_rule() {
        assert_eq!(Permission::Read.upgraded(), Some(Permission::ReadWrite));
        assert_eq!(Permission::Write.upgraded(), Some(Permission::ReadWrite));
        assert_eq!(Permission::ReadWrite.upgraded(), None);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("read".parse::<Permission>().unwrap(), Permission::Read);
        assert_eq!(
            "READWRITE".parse::<Permission>().unwrap(),
            Permission::ReadWrite
        );
        assert!("ADMIN".parse::<Permission>().is_err());
        assert_eq!(Permission::Write.to_string(), "WRITE");
        assert_eq!(Privilege::default().to_string(), "Default");
    }
}
