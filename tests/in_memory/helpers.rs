//! Shared test helpers for in-memory integration tests.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use eyre::WrapErr;
use flowday::{
    config::{DispatchConfig, InvitationConfig},
    notification::{
        adapters::RecordingNotifier,
        services::{DispatchSnapshot, DispatcherHandle, NotificationDispatcher},
    },
    project::{
        adapters::memory::{
            InMemoryMembershipRepository, InMemoryProjectRepository, InMemoryUserDirectory,
        },
        domain::{EmailAddress, Project, User, UserId},
        ports::UserDirectory,
        services::{InvitationService, ProjectService},
    },
    task::{adapters::memory::InMemoryTaskRepository, services::TaskService},
};
use mockable::Clock;
use rstest::fixture;

/// Clock pinned to an instant that tests move explicitly.
#[derive(Debug)]
pub struct SteppingClock {
    now: RwLock<DateTime<Utc>>,
}

impl SteppingClock {
    /// Creates a clock reading `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        if let Ok(mut now) = self.now.write() {
            *now += delta;
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now.read().map_or_else(|poisoned| *poisoned.into_inner(), |now| *now)
    }
}

/// Project service over in-memory adapters.
pub type Projects = ProjectService<
    InMemoryProjectRepository,
    InMemoryMembershipRepository,
    InMemoryTaskRepository,
    SteppingClock,
>;

/// Invitation service over in-memory adapters.
pub type Invitations = InvitationService<
    InMemoryProjectRepository,
    InMemoryMembershipRepository,
    InMemoryUserDirectory,
    SteppingClock,
>;

/// Task service over in-memory adapters.
pub type Tasks = TaskService<
    InMemoryProjectRepository,
    InMemoryMembershipRepository,
    InMemoryTaskRepository,
    SteppingClock,
>;

/// All services wired to one set of in-memory stores.
pub struct App {
    /// Project lifecycle.
    pub projects: Projects,
    /// Invitation lifecycle.
    pub invitations: Invitations,
    /// Task CRUD and views.
    pub tasks: Tasks,
    /// Registered users.
    pub users: Arc<InMemoryUserDirectory>,
    /// Delivered notifications.
    pub notifier: RecordingNotifier,
    /// Shared clock, starting at 2024-03-10T09:00:00Z.
    pub clock: Arc<SteppingClock>,
    handle: DispatcherHandle,
}

impl App {
    /// Registers a user under `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or already registered.
    pub async fn register(&self, email: &str) -> eyre::Result<UserId> {
        let user = User::new(EmailAddress::new(email)?);
        self.users
            .store(&user)
            .await
            .wrap_err_with(|| format!("register {email}"))?;
        Ok(user.id())
    }

    /// Creates a project owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails.
    pub async fn project(&self, owner: UserId, name: &str) -> eyre::Result<Project> {
        self.projects
            .create_project(owner, name)
            .await
            .wrap_err_with(|| format!("create project {name}"))
    }

    /// Invites `email` to the project and accepts on the invitee's behalf.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails.
    pub async fn join(&self, owner: UserId, project: &Project, email: &str) -> eyre::Result<()> {
        let invitation = self
            .invitations
            .invite(owner, project.id(), email)
            .await
            .wrap_err("invite")?;
        self.invitations
            .accept(invitation.user_id(), project.id())
            .await
            .wrap_err("accept")?;
        Ok(())
    }

    /// Stops the dispatcher after draining queued notifications.
    pub async fn drain(self) -> (RecordingNotifier, DispatchSnapshot) {
        let snapshot = self.handle.shutdown().await;
        (self.notifier, snapshot)
    }
}

/// Builds a UTC instant.
///
/// # Panics
///
/// Panics if the components do not form a valid timestamp.
#[must_use]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

/// Provides every service over fresh stores.
///
/// Must be called inside a tokio runtime.
#[fixture]
pub fn app() -> App {
    let clock = Arc::new(SteppingClock::new(at(2024, 3, 10, 9, 0)));
    let projects = Arc::new(InMemoryProjectRepository::new());
    let memberships = Arc::new(InMemoryMembershipRepository::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let notifier = RecordingNotifier::new();
    let (dispatcher, handle) =
        NotificationDispatcher::spawn(Arc::new(notifier.clone()), DispatchConfig::default());

    App {
        projects: ProjectService::new(
            Arc::clone(&projects),
            Arc::clone(&memberships),
            Arc::clone(&tasks),
            Arc::clone(&clock),
        ),
        invitations: InvitationService::new(
            Arc::clone(&projects),
            Arc::clone(&memberships),
            Arc::clone(&users),
            Arc::clone(&clock),
            dispatcher,
        )
        .with_config(InvitationConfig {
            base_url: "https://flowday.test/invitations".to_owned(),
        }),
        tasks: TaskService::new(projects, memberships, tasks, Arc::clone(&clock)),
        users,
        notifier,
        clock,
        handle,
    }
}
