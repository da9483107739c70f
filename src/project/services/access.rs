//! Access resolution over ownership and accepted memberships.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::error::ErrorKind;
use crate::project::{
    domain::{Project, ProjectId, UserId},
    ports::{
        MembershipRepository, MembershipRepositoryError, ProjectRepository,
        ProjectRepositoryError,
    },
};

/// How a user reaches a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectAccess {
    /// The user owns the project.
    Owner,
    /// The user holds an accepted membership.
    Member,
}

/// A project together with the caller's access to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectGrant {
    /// The visible project.
    pub project: Project,
    /// The caller's relationship to it.
    pub access: ProjectAccess,
}

impl ProjectGrant {
    /// Returns whether the grant allows project-level mutations.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.access == ProjectAccess::Owner
    }
}

/// Storage failures surfaced while resolving access.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    /// Project lookup failed.
    #[error(transparent)]
    Projects(#[from] ProjectRepositoryError),
    /// Membership lookup failed.
    #[error(transparent)]
    Memberships(#[from] MembershipRepositoryError),
}

impl AccessError {
    /// Classifies the failure for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Unavailable
    }
}

/// Result type for access resolution.
pub type AccessResult<T> = Result<T, AccessError>;

/// Computes which projects a user may read or mutate.
///
/// Reads are granted to owners and accepted members; mutations to owners
/// only. Every task query in the crate is filtered through this resolver.
/// Resolution never writes and never consults pending invitations.
pub struct AccessResolver<P, M>
where
    P: ProjectRepository,
    M: MembershipRepository,
{
    projects: Arc<P>,
    memberships: Arc<M>,
}

impl<P, M> Clone for AccessResolver<P, M>
where
    P: ProjectRepository,
    M: MembershipRepository,
{
    fn clone(&self) -> Self {
        Self {
            projects: Arc::clone(&self.projects),
            memberships: Arc::clone(&self.memberships),
        }
    }
}

impl<P, M> AccessResolver<P, M>
where
    P: ProjectRepository,
    M: MembershipRepository,
{
    /// Creates a resolver over the given repositories.
    #[must_use]
    pub const fn new(projects: Arc<P>, memberships: Arc<M>) -> Self {
        Self {
            projects,
            memberships,
        }
    }

    /// Returns the identifiers of every project `user_id` may read.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when either repository is unavailable.
    pub async fn resolve(&self, user_id: UserId) -> AccessResult<BTreeSet<ProjectId>> {
        let owned = self.projects.find_by_owner(user_id).await?;
        let memberships = self.memberships.find_accepted_by_user(user_id).await?;

        let visible: BTreeSet<ProjectId> = owned
            .iter()
            .map(Project::id)
            .chain(memberships.iter().map(|member| member.project_id()))
            .collect();
        tracing::debug!(
            user_id = %user_id,
            owned = owned.len(),
            visible = visible.len(),
            "resolved accessible projects"
        );
        Ok(visible)
    }

    /// Returns the project and the caller's access to it, or `None` when the
    /// project is absent or invisible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when either repository is unavailable.
    pub async fn authorize(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> AccessResult<Option<ProjectGrant>> {
        let Some(project) = self.projects.find_by_id(project_id).await? else {
            return Ok(None);
        };
        if project.is_owned_by(user_id) {
            return Ok(Some(ProjectGrant {
                project,
                access: ProjectAccess::Owner,
            }));
        }
        let membership = self.memberships.find_by_pair(project_id, user_id).await?;
        Ok(membership
            .filter(|member| member.is_accepted())
            .map(|_| ProjectGrant {
                project,
                access: ProjectAccess::Member,
            }))
    }

    /// Returns whether the caller may read the project and its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when either repository is unavailable.
    pub async fn can_access_project(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> AccessResult<bool> {
        Ok(self.authorize(user_id, project_id).await?.is_some())
    }

    /// Returns whether the caller may change project-level state such as
    /// membership or deletion.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when the project repository is unavailable.
    pub async fn can_mutate_project(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> AccessResult<bool> {
        let project = self.projects.find_by_id(project_id).await?;
        Ok(project.is_some_and(|found| found.is_owned_by(user_id)))
    }

    /// Returns whether the caller may create tasks in the project.
    ///
    /// Task creation is restricted to the owner; accepted members only read.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when the project repository is unavailable.
    pub async fn can_create_task(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> AccessResult<bool> {
        self.can_mutate_project(user_id, project_id).await
    }
}
