//! User identity as seen by the project domain.

use super::{ProjectDomainError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized email address used to look up invitees.
///
/// Addresses are trimmed and lowercased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, normalized email address.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvalidEmail`] when the value does not
    /// contain a non-empty local part and domain separated by a single `@`,
    /// or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        let is_valid = normalized
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            })
            && !normalized.chars().any(char::is_whitespace);

        if !is_valid {
            return Err(ProjectDomainError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered user account.
///
/// Credentials live with the identity provider; only the identifier and the
/// contact address matter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: EmailAddress,
}

impl User {
    /// Creates a user with a fresh identifier.
    #[must_use]
    pub fn new(email: EmailAddress) -> Self {
        Self {
            id: UserId::new(),
            email,
        }
    }

    /// Reconstructs a user from persisted parts.
    #[must_use]
    pub const fn from_parts(id: UserId, email: EmailAddress) -> Self {
        Self { id, email }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user's email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }
}
