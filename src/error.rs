//! Caller-facing error taxonomy.
//!
//! Every service error in the crate classifies itself into one of the
//! [`ErrorKind`] buckets so transport layers can map failures to their own
//! status codes without matching on individual variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad failure category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The entity is absent or not visible to the caller.
    ///
    /// Absent and inaccessible entities are reported identically so that
    /// callers cannot probe for the existence of other tenants' data.
    NotFound,
    /// The caller is authenticated but lacks the required role.
    Forbidden,
    /// The request collides with existing state.
    Conflict,
    /// The request is malformed.
    InvalidInput,
    /// A storage dependency failed.
    Unavailable,
}

impl ErrorKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::InvalidInput => "invalid_input",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
