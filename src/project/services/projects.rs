//! Project lifecycle service.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;

use super::{AccessError, AccessResolver, ProjectGrant};
use crate::error::ErrorKind;
use crate::project::{
    domain::{Project, ProjectDomainError, ProjectId, ProjectName, UserId},
    ports::{
        MembershipRepository, MembershipRepositoryError, ProjectRepository,
        ProjectRepositoryError,
    },
};
use crate::task::ports::{TaskRepository, TaskRepositoryError};

/// Service-level errors for project operations.
#[derive(Debug, Clone, Error)]
pub enum ProjectServiceError {
    /// The project is absent or invisible to the caller.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// The caller can read the project but does not own it.
    #[error("user {user_id} does not own project {project_id}")]
    NotOwner {
        /// Caller.
        user_id: UserId,
        /// Target project.
        project_id: ProjectId,
    },
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// Access resolution failed.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Project storage failed.
    #[error(transparent)]
    Projects(#[from] ProjectRepositoryError),
    /// Membership storage failed.
    #[error(transparent)]
    Memberships(#[from] MembershipRepositoryError),
    /// Task storage failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
}

impl ProjectServiceError {
    /// Classifies the failure for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProjectNotFound(_) | Self::Projects(ProjectRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::NotOwner { .. } => ErrorKind::Forbidden,
            Self::Domain(_) => ErrorKind::InvalidInput,
            Self::Projects(ProjectRepositoryError::DuplicateProject(_)) => ErrorKind::Conflict,
            Self::Access(_)
            | Self::Projects(ProjectRepositoryError::Persistence(_))
            | Self::Memberships(_)
            | Self::Tasks(_) => ErrorKind::Unavailable,
        }
    }
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Creates, lists and deletes projects.
pub struct ProjectService<P, M, T, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    access: AccessResolver<P, M>,
    projects: Arc<P>,
    memberships: Arc<M>,
    tasks: Arc<T>,
    clock: Arc<C>,
}

impl<P, M, T, C> Clone for ProjectService<P, M, T, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
            projects: Arc::clone(&self.projects),
            memberships: Arc::clone(&self.memberships),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, M, T, C> ProjectService<P, M, T, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a project service.
    #[must_use]
    pub fn new(projects: Arc<P>, memberships: Arc<M>, tasks: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            access: AccessResolver::new(Arc::clone(&projects), Arc::clone(&memberships)),
            projects,
            memberships,
            tasks,
            clock,
        }
    }

    /// Creates a project owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Domain`] for an invalid name.
    pub async fn create_project(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> ProjectServiceResult<Project> {
        let project = Project::new(owner_id, ProjectName::new(name)?, &*self.clock);
        self.projects.store(&project).await?;
        tracing::info!(
            project_id = %project.id(),
            owner_id = %owner_id,
            "project created"
        );
        Ok(project)
    }

    /// Lists every project the user can read: owned projects first, then
    /// projects reached through accepted memberships.
    ///
    /// # Errors
    ///
    /// Returns storage errors when either lookup fails.
    pub async fn list_projects(&self, user_id: UserId) -> ProjectServiceResult<Vec<Project>> {
        let mut visible = self.projects.find_by_owner(user_id).await?;
        let owned: BTreeSet<ProjectId> = visible.iter().map(Project::id).collect();
        let joined: Vec<ProjectId> = self
            .memberships
            .find_accepted_by_user(user_id)
            .await?
            .into_iter()
            .map(|member| member.project_id())
            .filter(|project_id| !owned.contains(project_id))
            .collect();
        if !joined.is_empty() {
            visible.extend(self.projects.find_by_ids(&joined).await?);
        }
        Ok(visible)
    }

    /// Returns a project the user can read.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::ProjectNotFound`] when the project is
    /// absent or invisible to the caller.
    pub async fn get_project(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> ProjectServiceResult<ProjectGrant> {
        self.access
            .authorize(user_id, project_id)
            .await?
            .ok_or(ProjectServiceError::ProjectNotFound(project_id))
    }

    /// Deletes a project together with its tasks and memberships.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::ProjectNotFound`] when the caller cannot
    /// see the project and [`ProjectServiceError::NotOwner`] when the caller
    /// is only a member.
    pub async fn delete_project(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> ProjectServiceResult<()> {
        let grant = self.get_project(user_id, project_id).await?;
        if !grant.is_owner() {
            return Err(ProjectServiceError::NotOwner {
                user_id,
                project_id,
            });
        }

        let removed_tasks = self.tasks.delete_by_project(project_id).await?;
        let removed_members = self.memberships.delete_by_project(project_id).await?;
        self.projects.delete(project_id).await?;
        tracing::info!(
            project_id = %project_id,
            removed_tasks,
            removed_members,
            "project deleted"
        );
        Ok(())
    }
}
