//! Invitation tokens and their stored digests.
//!
//! The plaintext token only ever travels inside the invitation link. Storage
//! keeps the SHA-256 digest, so a leaked membership table cannot be replayed
//! against the acceptance endpoint.

use super::ProjectDomainError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of random bytes in a generated token.
const TOKEN_BYTES: usize = 16;

/// Length of a hex-encoded token.
const TOKEN_HEX_LENGTH: usize = TOKEN_BYTES * 2;

/// Length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LENGTH: usize = 64;

/// Plaintext invitation token.
///
/// Generated from 128 bits of operating-system-seeded randomness and encoded
/// as lowercase hex. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct InvitationToken(String);

impl InvitationToken {
    /// Generates a new random token.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        Self(hex::encode(bytes))
    }

    /// Parses a token received from a client.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::MalformedInvitationToken`] when the value
    /// is not a 32-character hex string.
    pub fn parse(value: &str) -> Result<Self, ProjectDomainError> {
        let normalized = value.trim().to_ascii_lowercase();
        if !is_hex_of_length(&normalized, TOKEN_HEX_LENGTH) {
            return Err(ProjectDomainError::MalformedInvitationToken);
        }
        Ok(Self(normalized))
    }

    /// Returns the plaintext token for embedding in a link.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Computes the digest stored alongside the membership record.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        let hash = Sha256::digest(self.0.as_bytes());
        TokenDigest(hex::encode(hash))
    }
}

impl fmt::Debug for InvitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvitationToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of an invitation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Restores a digest read from storage.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::MalformedInvitationToken`] when the value
    /// is not a 64-character hex string.
    pub fn from_hex(value: impl Into<String>) -> Result<Self, ProjectDomainError> {
        let raw = value.into();
        if !is_hex_of_length(&raw, DIGEST_HEX_LENGTH) {
            return Err(ProjectDomainError::MalformedInvitationToken);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Returns the digest as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_hex_of_length(value: &str, length: usize) -> bool {
    value.len() == length && value.chars().all(|ch| ch.is_ascii_hexdigit())
}
