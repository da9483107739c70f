//! Shared world state for invitation lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use flowday::{
    config::DispatchConfig,
    notification::{adapters::LoggingNotifier, services::NotificationDispatcher},
    project::{
        adapters::memory::{
            InMemoryMembershipRepository, InMemoryProjectRepository, InMemoryUserDirectory,
        },
        domain::{ProjectId, ProjectMember, UserId},
        services::{AccessResolver, InvitationError, InvitationService, ProjectService},
    },
    task::adapters::memory::InMemoryTaskRepository,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Invitation service type used by the BDD world.
pub type TestInvitations = InvitationService<
    InMemoryProjectRepository,
    InMemoryMembershipRepository,
    InMemoryUserDirectory,
    DefaultClock,
>;

/// Project service type used by the BDD world.
pub type TestProjects = ProjectService<
    InMemoryProjectRepository,
    InMemoryMembershipRepository,
    InMemoryTaskRepository,
    DefaultClock,
>;

/// Scenario world for invitation behaviour tests.
pub struct InvitationWorld {
    pub invitations: TestInvitations,
    pub projects: TestProjects,
    pub access: AccessResolver<InMemoryProjectRepository, InMemoryMembershipRepository>,
    pub users: Arc<InMemoryUserDirectory>,
    pub registered: HashMap<String, UserId>,
    pub owner: Option<UserId>,
    pub project: Option<ProjectId>,
    pub last_invitation: Option<Result<ProjectMember, InvitationError>>,
    pub last_rejection: Option<Result<(), InvitationError>>,
}

impl InvitationWorld {
    /// Creates a world over empty in-memory stores.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let projects = Arc::new(InMemoryProjectRepository::new());
        let memberships = Arc::new(InMemoryMembershipRepository::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let clock = Arc::new(DefaultClock);
        let (dispatcher, _handle) =
            NotificationDispatcher::spawn(Arc::new(LoggingNotifier::new()), DispatchConfig::default());

        Self {
            invitations: InvitationService::new(
                Arc::clone(&projects),
                Arc::clone(&memberships),
                Arc::clone(&users),
                Arc::clone(&clock),
                dispatcher,
            ),
            projects: ProjectService::new(
                Arc::clone(&projects),
                Arc::clone(&memberships),
                Arc::new(InMemoryTaskRepository::new()),
                clock,
            ),
            access: AccessResolver::new(projects, memberships),
            users,
            registered: HashMap::new(),
            owner: None,
            project: None,
            last_invitation: None,
            last_rejection: None,
        }
    }

    /// Returns the identifier registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if no user was registered under that address.
    pub fn user(&self, email: &str) -> Result<UserId, eyre::Report> {
        self.registered
            .get(email)
            .copied()
            .ok_or_else(|| eyre::eyre!("no user registered as {email} in scenario world"))
    }

    /// Returns the scenario's owner and project.
    ///
    /// # Errors
    ///
    /// Returns an error if the background has not created the project.
    pub fn owned_project(&self) -> Result<(UserId, ProjectId), eyre::Report> {
        self.owner
            .zip(self.project)
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }
}

impl Default for InvitationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> InvitationWorld {
    InvitationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
