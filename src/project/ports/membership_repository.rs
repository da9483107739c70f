//! Repository port for membership persistence.

use crate::project::domain::{MembershipId, ProjectId, ProjectMember, TokenDigest, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for membership repository operations.
pub type MembershipRepositoryResult<T> = Result<T, MembershipRepositoryError>;

/// Membership persistence contract.
///
/// Implementations must enforce that at most one record exists per
/// `(project_id, user_id)` pair, atomically with the insert. A unique index
/// or an equivalent compare-and-swap closes the race between two concurrent
/// invitations for the same pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Inserts a new membership record.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipRepositoryError::DuplicateMembership`] when a
    /// record already exists for the same project and user.
    async fn insert(&self, member: &ProjectMember) -> MembershipRepositoryResult<()>;

    /// Finds the record for a project and user in any status.
    async fn find_by_pair(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Option<ProjectMember>>;

    /// Finds a pending record by its token digest.
    async fn find_pending_by_token(
        &self,
        digest: &TokenDigest,
    ) -> MembershipRepositoryResult<Option<ProjectMember>>;

    /// Returns the accepted memberships held by a user.
    async fn find_accepted_by_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>>;

    /// Returns the pending invitations addressed to a user, oldest first.
    async fn find_pending_by_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>>;

    /// Returns the accepted members of a project, earliest invitation first.
    async fn find_accepted_by_project(
        &self,
        project_id: ProjectId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>>;

    /// Marks a pending record as accepted.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipRepositoryError::NotFound`] when no pending record
    /// with the identifier exists.
    async fn accept_pending(
        &self,
        id: MembershipId,
        accepted_at: DateTime<Utc>,
    ) -> MembershipRepositoryResult<()>;

    /// Deletes a record only while it is still pending. Returns whether a
    /// record was removed.
    async fn delete_pending(&self, id: MembershipId) -> MembershipRepositoryResult<bool>;

    /// Deletes the record for a project and user. Returns whether a record
    /// was removed.
    async fn delete_by_pair(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> MembershipRepositoryResult<bool>;

    /// Deletes every record belonging to a project. Returns the count removed.
    async fn delete_by_project(&self, project_id: ProjectId) -> MembershipRepositoryResult<u64>;
}

/// Errors returned by membership repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MembershipRepositoryError {
    /// A record for the same project and user already exists.
    #[error("membership already exists for user {user_id} in project {project_id}")]
    DuplicateMembership {
        /// Project of the conflicting record.
        project_id: ProjectId,
        /// User of the conflicting record.
        user_id: UserId,
    },

    /// The record was not found.
    #[error("membership not found: {0}")]
    NotFound(MembershipId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MembershipRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
