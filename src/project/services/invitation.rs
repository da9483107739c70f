//! Invitation lifecycle: invite, accept, reject and remove.
//!
//! A membership record moves from `pending` to `accepted`, or is deleted on
//! rejection or removal. At most one record exists per project and user, so
//! a second invitation while one is outstanding is refused rather than
//! duplicated. Emails are queued on the [`NotificationDispatcher`] and never
//! awaited; a failed delivery does not undo the state change that caused it.

use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;

use super::access::{AccessError, AccessResolver};
use crate::config::InvitationConfig;
use crate::error::ErrorKind;
use crate::notification::{domain::Notification, services::NotificationDispatcher};
use crate::project::{
    domain::{
        EmailAddress, InvitationToken, Project, ProjectDomainError, ProjectId, ProjectMember,
        UserId,
    },
    ports::{
        MembershipRepository, MembershipRepositoryError, ProjectRepository,
        ProjectRepositoryError, UserDirectory, UserDirectoryError,
    },
};

/// Service-level errors for invitation operations.
#[derive(Debug, Clone, Error)]
pub enum InvitationError {
    /// The caller does not own the project, or the project does not exist.
    #[error("user {user_id} does not own project {project_id}")]
    NotOwner {
        /// Caller.
        user_id: UserId,
        /// Target project.
        project_id: ProjectId,
    },
    /// No account matches the invitee address.
    #[error("no user is registered with email {0}")]
    UnknownUser(EmailAddress),
    /// The invitee already has accepted access.
    #[error("user {user_id} is already a member of project {project_id}")]
    AlreadyMember {
        /// Target project.
        project_id: ProjectId,
        /// Invitee.
        user_id: UserId,
    },
    /// An invitation for the pair is still awaiting a response.
    #[error("an invitation to project {project_id} is already pending for user {user_id}")]
    InvitationPending {
        /// Target project.
        project_id: ProjectId,
        /// Invitee.
        user_id: UserId,
    },
    /// No pending invitation exists for the pair.
    #[error("no pending invitation to project {project_id} for user {user_id}")]
    InvitationNotFound {
        /// Target project.
        project_id: ProjectId,
        /// Invitee.
        user_id: UserId,
    },
    /// The acceptance token does not refer to a pending invitation for the
    /// caller.
    #[error("invitation token is unknown or already used")]
    UnknownToken,
    /// The owner cannot be removed from their own project.
    #[error("cannot remove the owner of project {0}")]
    CannotRemoveOwner(ProjectId),
    /// The project is absent or invisible to the caller.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
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
    /// User lookup failed.
    #[error(transparent)]
    Users(#[from] UserDirectoryError),
}

impl InvitationError {
    /// Classifies the failure for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } => ErrorKind::Forbidden,
            Self::UnknownUser(_)
            | Self::InvitationNotFound { .. }
            | Self::UnknownToken
            | Self::ProjectNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyMember { .. } | Self::InvitationPending { .. } => ErrorKind::Conflict,
            Self::CannotRemoveOwner(_) | Self::Domain(_) => ErrorKind::InvalidInput,
            Self::Access(_) | Self::Projects(_) | Self::Memberships(_) | Self::Users(_) => {
                ErrorKind::Unavailable
            }
        }
    }
}

/// Result type for invitation operations.
pub type InvitationResult<T> = Result<T, InvitationError>;

/// A pending invitation addressed to the caller, with its project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInvitation {
    /// The pending membership record.
    pub invitation: ProjectMember,
    /// The project the invitation is for.
    pub project: Project,
}

/// Invitation state machine.
pub struct InvitationService<P, M, U, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    access: AccessResolver<P, M>,
    projects: Arc<P>,
    memberships: Arc<M>,
    users: Arc<U>,
    clock: Arc<C>,
    dispatcher: NotificationDispatcher,
    config: InvitationConfig,
}

impl<P, M, U, C> Clone for InvitationService<P, M, U, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
            projects: Arc::clone(&self.projects),
            memberships: Arc::clone(&self.memberships),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
            dispatcher: self.dispatcher.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P, M, U, C> InvitationService<P, M, U, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates an invitation service with default link settings.
    #[must_use]
    pub fn new(
        projects: Arc<P>,
        memberships: Arc<M>,
        users: Arc<U>,
        clock: Arc<C>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            access: AccessResolver::new(Arc::clone(&projects), Arc::clone(&memberships)),
            projects,
            memberships,
            users,
            clock,
            dispatcher,
            config: InvitationConfig::default(),
        }
    }

    /// Replaces the invitation link settings.
    #[must_use]
    pub fn with_config(mut self, config: InvitationConfig) -> Self {
        self.config = config;
        self
    }

    /// Invites the user registered under `invitee_email` to a project.
    ///
    /// On success the pending record is stored and an invitation email with
    /// the acceptance link is queued.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::NotOwner`] unless the caller owns the
    /// project, [`InvitationError::UnknownUser`] when no account matches,
    /// [`InvitationError::AlreadyMember`] or
    /// [`InvitationError::InvitationPending`] when a record already exists
    /// for the pair, and storage errors otherwise.
    pub async fn invite(
        &self,
        owner_id: UserId,
        project_id: ProjectId,
        invitee_email: &str,
    ) -> InvitationResult<ProjectMember> {
        let email = EmailAddress::new(invitee_email)?;
        let project = self.owned_project(owner_id, project_id).await?;
        let invitee = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| InvitationError::UnknownUser(email.clone()))?;

        if invitee.id() == owner_id {
            return Err(InvitationError::AlreadyMember {
                project_id,
                user_id: owner_id,
            });
        }
        if let Some(existing) = self
            .memberships
            .find_by_pair(project_id, invitee.id())
            .await?
        {
            return Err(conflict_for(&existing));
        }

        let token = InvitationToken::generate();
        let invitation =
            ProjectMember::invite(project_id, invitee.id(), token.digest(), &*self.clock);
        match self.memberships.insert(&invitation).await {
            Ok(()) => {}
            Err(MembershipRepositoryError::DuplicateMembership { .. }) => {
                let winner = self
                    .memberships
                    .find_by_pair(project_id, invitee.id())
                    .await?;
                return Err(winner.map_or(
                    InvitationError::InvitationPending {
                        project_id,
                        user_id: invitee.id(),
                    },
                    |member| conflict_for(&member),
                ));
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            project_id = %project_id,
            invitee_id = %invitee.id(),
            membership_id = %invitation.id(),
            "invitation created"
        );
        self.dispatcher.dispatch(Notification::Invitation {
            to: email.as_str().to_owned(),
            project_name: project.name().as_str().to_owned(),
            acceptance_link: self.config.acceptance_link(token.as_str()),
        });
        Ok(invitation)
    }

    /// Accepts the caller's pending invitation to a project.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::InvitationNotFound`] unless a pending
    /// record exists for the pair.
    pub async fn accept(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> InvitationResult<ProjectMember> {
        let pending = self.pending_for(user_id, project_id).await?;
        self.accept_pending(pending).await
    }

    /// Accepts the pending invitation an emailed token refers to.
    ///
    /// Tokens are single use: after acceptance the token no longer resolves.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::Domain`] for a malformed token and
    /// [`InvitationError::UnknownToken`] when the token is unknown, already
    /// used, or addressed to another user.
    pub async fn accept_by_token(
        &self,
        user_id: UserId,
        raw_token: &str,
    ) -> InvitationResult<ProjectMember> {
        let token = InvitationToken::parse(raw_token)?;
        let pending = self
            .memberships
            .find_pending_by_token(&token.digest())
            .await?
            .filter(|member| member.user_id() == user_id)
            .ok_or(InvitationError::UnknownToken)?;
        self.accept_pending(pending).await
    }

    /// Declines the caller's pending invitation and notifies the owner.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::InvitationNotFound`] unless a pending
    /// record exists for the pair.
    pub async fn reject(&self, user_id: UserId, project_id: ProjectId) -> InvitationResult<()> {
        let pending = self.pending_for(user_id, project_id).await?;
        let invited_to = self.projects.find_by_id(project_id).await?;

        if !self.memberships.delete_pending(pending.id()).await? {
            return Err(InvitationError::InvitationNotFound {
                project_id,
                user_id,
            });
        }
        tracing::info!(
            project_id = %project_id,
            user_id = %user_id,
            membership_id = %pending.id(),
            "invitation rejected"
        );

        if let Some(project) = invited_to {
            self.notify_owner_of_rejection(&project, user_id).await;
        }
        Ok(())
    }

    /// Removes a member or pending invitee from a project.
    ///
    /// Returns whether a record was removed; removing a user without a record
    /// succeeds with `false`.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::NotOwner`] unless the caller owns the
    /// project and [`InvitationError::CannotRemoveOwner`] when the target is
    /// the owner.
    pub async fn remove(
        &self,
        owner_id: UserId,
        project_id: ProjectId,
        member_id: UserId,
    ) -> InvitationResult<bool> {
        let project = self.owned_project(owner_id, project_id).await?;
        if project.is_owned_by(member_id) {
            return Err(InvitationError::CannotRemoveOwner(project_id));
        }
        let removed = self
            .memberships
            .delete_by_pair(project_id, member_id)
            .await?;
        tracing::info!(
            project_id = %project_id,
            member_id = %member_id,
            removed,
            "membership removed"
        );
        Ok(removed)
    }

    /// Lists the accepted members of a project, owner first.
    ///
    /// The owner entry is synthesized from the project record.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::ProjectNotFound`] when the caller cannot
    /// read the project.
    pub async fn list_members(
        &self,
        requester_id: UserId,
        project_id: ProjectId,
    ) -> InvitationResult<Vec<ProjectMember>> {
        let grant = self
            .access
            .authorize(requester_id, project_id)
            .await?
            .ok_or(InvitationError::ProjectNotFound(project_id))?;
        let accepted = self
            .memberships
            .find_accepted_by_project(project_id)
            .await?;

        let owner_id = grant.project.owner_id();
        let mut members = Vec::with_capacity(accepted.len() + 1);
        if !accepted.iter().any(|member| member.user_id() == owner_id) {
            members.push(ProjectMember::synthesized_owner(&grant.project));
        }
        members.extend(accepted);
        Ok(members)
    }

    /// Lists invitations awaiting the caller's response, oldest first.
    ///
    /// Invitations whose project no longer exists are omitted.
    ///
    /// # Errors
    ///
    /// Returns storage errors when lookups fail.
    pub async fn list_pending_invitations(
        &self,
        user_id: UserId,
    ) -> InvitationResult<Vec<PendingInvitation>> {
        let pending = self.memberships.find_pending_by_user(user_id).await?;
        let project_ids: Vec<ProjectId> =
            pending.iter().map(ProjectMember::project_id).collect();
        let projects = self.projects.find_by_ids(&project_ids).await?;

        Ok(pending
            .into_iter()
            .filter_map(|invitation| {
                projects
                    .iter()
                    .find(|project| project.id() == invitation.project_id())
                    .cloned()
                    .map(|project| PendingInvitation {
                        invitation,
                        project,
                    })
            })
            .collect())
    }

    async fn owned_project(
        &self,
        owner_id: UserId,
        project_id: ProjectId,
    ) -> InvitationResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .filter(|project| project.is_owned_by(owner_id))
            .ok_or(InvitationError::NotOwner {
                user_id: owner_id,
                project_id,
            })
    }

    async fn pending_for(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> InvitationResult<ProjectMember> {
        self.memberships
            .find_by_pair(project_id, user_id)
            .await?
            .filter(ProjectMember::is_pending)
            .ok_or(InvitationError::InvitationNotFound {
                project_id,
                user_id,
            })
    }

    async fn accept_pending(&self, mut pending: ProjectMember) -> InvitationResult<ProjectMember> {
        let accepted_at = self.clock.utc();
        match self
            .memberships
            .accept_pending(pending.id(), accepted_at)
            .await
        {
            Ok(()) => {}
            Err(MembershipRepositoryError::NotFound(_)) => {
                return Err(InvitationError::InvitationNotFound {
                    project_id: pending.project_id(),
                    user_id: pending.user_id(),
                });
            }
            Err(err) => return Err(err.into()),
        }
        pending.accept_at(accepted_at)?;
        tracing::info!(
            project_id = %pending.project_id(),
            user_id = %pending.user_id(),
            membership_id = %pending.id(),
            "invitation accepted"
        );
        Ok(pending)
    }

    async fn notify_owner_of_rejection(&self, project: &Project, rejecting_user_id: UserId) {
        let owner = self.users.find_by_id(project.owner_id()).await;
        let rejecting = self.users.find_by_id(rejecting_user_id).await;
        match (owner, rejecting) {
            (Ok(Some(owner)), Ok(Some(rejecting))) => {
                self.dispatcher.dispatch(Notification::RejectionNotice {
                    owner_email: owner.email().as_str().to_owned(),
                    project_name: project.name().as_str().to_owned(),
                    rejecting_user_email: rejecting.email().as_str().to_owned(),
                });
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(
                    project_id = %project.id(),
                    error = %err,
                    "rejection notice skipped: user lookup failed"
                );
            }
            _ => {
                tracing::warn!(
                    project_id = %project.id(),
                    "rejection notice skipped: user not found"
                );
            }
        }
    }
}

fn conflict_for(existing: &ProjectMember) -> InvitationError {
    if existing.is_accepted() {
        InvitationError::AlreadyMember {
            project_id: existing.project_id(),
            user_id: existing.user_id(),
        }
    } else {
        InvitationError::InvitationPending {
            project_id: existing.project_id(),
            user_id: existing.user_id(),
        }
    }
}
