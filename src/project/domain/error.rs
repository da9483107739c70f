//! Error types for project domain validation and parsing.

use super::MembershipId;
use thiserror::Error;

/// Errors returned while constructing or transitioning project domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds the persisted column width.
    #[error("project name is {0} characters, expected at most 255")]
    ProjectNameTooLong(usize),

    /// The email address is not of the form `local@domain`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// The invitation token is not a well-formed token string.
    #[error("malformed invitation token")]
    MalformedInvitationToken,

    /// The membership is not awaiting a response.
    #[error("membership {0} is not pending")]
    InvitationNotPending(MembershipId),
}

/// Error returned while parsing membership roles or statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown membership value: {0}")]
pub struct ParseMembershipError(pub String);
