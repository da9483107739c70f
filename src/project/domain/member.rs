//! Project membership records and their lifecycle.

use super::{
    MembershipId, ParseMembershipError, Project, ProjectDomainError, ProjectId, TokenDigest,
    UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Role a user holds within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    /// The project owner. Only ever synthesized from project ownership.
    Owner,
    /// An invited collaborator with read access.
    Member,
}

impl MembershipRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }
}

impl TryFrom<&str> for MembershipRole {
    type Error = ParseMembershipError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            _ => Err(ParseMembershipError(value.to_owned())),
        }
    }
}

/// Invitation state of a membership record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Invitation sent, no response yet.
    Pending,
    /// Invitation accepted; the user can read the project.
    Accepted,
}

impl MembershipStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

impl TryFrom<&str> for MembershipStatus {
    type Error = ParseMembershipError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            _ => Err(ParseMembershipError(value.to_owned())),
        }
    }
}

/// A user's relationship to a project other than plain ownership.
///
/// At most one record exists per `(project_id, user_id)` pair. Rejection and
/// removal delete the record rather than moving it to a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    id: MembershipId,
    project_id: ProjectId,
    user_id: UserId,
    role: MembershipRole,
    status: MembershipStatus,
    #[serde(skip)]
    token_digest: Option<TokenDigest>,
    invited_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMemberData {
    /// Persisted membership identifier.
    pub id: MembershipId,
    /// Persisted project identifier.
    pub project_id: ProjectId,
    /// Persisted member identifier.
    pub user_id: UserId,
    /// Persisted role.
    pub role: MembershipRole,
    /// Persisted invitation status.
    pub status: MembershipStatus,
    /// Persisted digest of the invitation token, if any.
    pub token_digest: Option<TokenDigest>,
    /// Persisted invitation timestamp.
    pub invited_at: DateTime<Utc>,
    /// Persisted acceptance timestamp.
    pub accepted_at: Option<DateTime<Utc>>,
}

impl ProjectMember {
    /// Creates a pending invitation for `user_id` to join `project_id`.
    #[must_use]
    pub fn invite(
        project_id: ProjectId,
        user_id: UserId,
        token_digest: TokenDigest,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: MembershipId::new(),
            project_id,
            user_id,
            role: MembershipRole::Member,
            status: MembershipStatus::Pending,
            token_digest: Some(token_digest),
            invited_at: clock.utc(),
            accepted_at: None,
        }
    }

    /// Synthesizes the owner entry shown in member listings.
    ///
    /// The entry is never persisted; both timestamps are the project creation
    /// time.
    #[must_use]
    pub fn synthesized_owner(project: &Project) -> Self {
        Self {
            id: MembershipId::new(),
            project_id: project.id(),
            user_id: project.owner_id(),
            role: MembershipRole::Owner,
            status: MembershipStatus::Accepted,
            token_digest: None,
            invited_at: project.created_at(),
            accepted_at: Some(project.created_at()),
        }
    }

    /// Reconstructs a membership from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMemberData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            user_id: data.user_id,
            role: data.role,
            status: data.status,
            token_digest: data.token_digest,
            invited_at: data.invited_at,
            accepted_at: data.accepted_at,
        }
    }

    /// Returns the membership identifier.
    #[must_use]
    pub const fn id(&self) -> MembershipId {
        self.id
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the member's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the member role.
    #[must_use]
    pub const fn role(&self) -> MembershipRole {
        self.role
    }

    /// Returns the invitation status.
    #[must_use]
    pub const fn status(&self) -> MembershipStatus {
        self.status
    }

    /// Returns the stored token digest, if any.
    #[must_use]
    pub const fn token_digest(&self) -> Option<&TokenDigest> {
        self.token_digest.as_ref()
    }

    /// Returns when the invitation was created.
    #[must_use]
    pub const fn invited_at(&self) -> DateTime<Utc> {
        self.invited_at
    }

    /// Returns when the invitation was accepted, if it was.
    #[must_use]
    pub const fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    /// Returns whether the invitation awaits a response.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    /// Returns whether the membership grants read access.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.status == MembershipStatus::Accepted
    }

    /// Accepts a pending invitation.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvitationNotPending`] when the record
    /// has already been accepted.
    pub fn accept(&mut self, clock: &impl Clock) -> Result<(), ProjectDomainError> {
        self.accept_at(clock.utc())
    }

    /// Accepts a pending invitation at an explicit instant.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectDomainError::InvitationNotPending`] when the record
    /// has already been accepted.
    pub fn accept_at(&mut self, accepted_at: DateTime<Utc>) -> Result<(), ProjectDomainError> {
        if !self.is_pending() {
            return Err(ProjectDomainError::InvitationNotPending(self.id));
        }
        self.status = MembershipStatus::Accepted;
        self.accepted_at = Some(accepted_at);
        Ok(())
    }
}
