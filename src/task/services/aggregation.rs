//! Task aggregation engine.
//!
//! Every read goes through the [`AccessResolver`]: single-task reads and
//! project listings check one project, while the by-date, by-range and stats
//! views resolve the caller's whole accessible project set and query across
//! it. Mutations require project ownership.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::Serialize;
use thiserror::Error;

use crate::config::CalendarConfig;
use crate::error::ErrorKind;
use crate::project::{
    domain::{ProjectId, UserId},
    ports::{MembershipRepository, ProjectRepository},
    services::{AccessError, AccessResolver, ProjectGrant},
};
use crate::task::{
    domain::{
        Calendar, Pagination, Task, TaskDomainError, TaskFilter, TaskId, TaskPatch, TaskPriority,
        TaskStats, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError},
};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            priority: TaskPriority::default(),
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date. Without one the task is due at the start of the
    /// current day.
    #[must_use]
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// One page of a project's tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPage {
    /// Tasks on this page, in the requested order.
    pub tasks: Vec<Task>,
    /// Number of tasks in the project.
    pub total: u64,
    /// Normalized page request that produced this page.
    pub pagination: Pagination,
}

/// Service-level errors for task operations.
#[derive(Debug, Clone, Error)]
pub enum TaskServiceError {
    /// The project is absent or invisible to the caller.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// The task is absent or belongs to a project invisible to the caller.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
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
    Domain(#[from] TaskDomainError),
    /// Access resolution failed.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Task storage failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

impl TaskServiceError {
    /// Classifies the failure for callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProjectNotFound(_)
            | Self::TaskNotFound(_)
            | Self::Repository(TaskRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::NotOwner { .. } => ErrorKind::Forbidden,
            Self::Domain(_) => ErrorKind::InvalidInput,
            Self::Repository(TaskRepositoryError::DuplicateTask(_)) => ErrorKind::Conflict,
            Self::Access(_) | Self::Repository(TaskRepositoryError::Persistence(_)) => {
                ErrorKind::Unavailable
            }
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task CRUD and aggregation service.
pub struct TaskService<P, M, T, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    access: AccessResolver<P, M>,
    tasks: Arc<T>,
    clock: Arc<C>,
    calendar: Calendar,
}

impl<P, M, T, C> Clone for TaskService<P, M, T, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            access: self.access.clone(),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
            calendar: self.calendar,
        }
    }
}

impl<P, M, T, C> TaskService<P, M, T, C>
where
    P: ProjectRepository,
    M: MembershipRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a task service with UTC day boundaries.
    #[must_use]
    pub fn new(projects: Arc<P>, memberships: Arc<M>, tasks: Arc<T>, clock: Arc<C>) -> Self {
        Self {
            access: AccessResolver::new(projects, memberships),
            tasks,
            clock,
            calendar: Calendar::default(),
        }
    }

    /// Replaces the calendar used for day boundaries.
    #[must_use]
    pub fn with_calendar(mut self, config: CalendarConfig) -> Self {
        self.calendar = Calendar::from_config(config);
        self
    }

    /// Creates a task in a project the caller owns.
    ///
    /// The task starts as `todo`; without an explicit due date it is due at
    /// the start of the current day.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] when the caller cannot
    /// see the project, [`TaskServiceError::NotOwner`] when the caller is only
    /// a member, and [`TaskServiceError::Domain`] for an invalid title.
    pub async fn create_task(
        &self,
        user_id: UserId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let title = TaskTitle::new(request.title)?;
        self.owned_project(user_id, request.project_id).await?;

        let due_date = match request.due_date {
            Some(due_date) => due_date,
            None => self.calendar.today(self.clock.utc())?.start(),
        };
        let mut task = Task::new(request.project_id, title, &*self.clock)
            .with_priority(request.priority)
            .with_due_date(due_date);
        if let Some(description) = request.description {
            task = task.with_description(description);
        }
        self.tasks.store(&task).await?;
        tracing::info!(
            task_id = %task.id(),
            project_id = %task.project_id(),
            "task created"
        );
        Ok(task)
    }

    /// Returns a task the caller can read.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is absent or
    /// its project is invisible to the caller.
    pub async fn get_task(&self, user_id: UserId, task_id: TaskId) -> TaskServiceResult<Task> {
        let (task, _) = self.visible_task(user_id, task_id).await?;
        Ok(task)
    }

    /// Lists one page of a project's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] when the caller cannot
    /// see the project.
    pub async fn list_project_tasks(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        pagination: Pagination,
    ) -> TaskServiceResult<TaskPage> {
        self.access
            .authorize(user_id, project_id)
            .await?
            .ok_or(TaskServiceError::ProjectNotFound(project_id))?;

        let tasks = self
            .tasks
            .list_project_page(project_id, &pagination)
            .await?;
        let total = self
            .tasks
            .count(&[project_id], &TaskFilter::all())
            .await?;
        tracing::debug!(
            project_id = %project_id,
            returned = tasks.len(),
            total,
            order = pagination.order().as_str(),
            "listed project tasks"
        );
        Ok(TaskPage {
            tasks,
            total,
            pagination,
        })
    }

    /// Applies a partial update to a task in a project the caller owns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is invisible
    /// and [`TaskServiceError::NotOwner`] when the caller is only a member.
    pub async fn update_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> TaskServiceResult<Task> {
        let (task, grant) = self.visible_task(user_id, task_id).await?;
        require_owner(user_id, &grant)?;
        if patch.is_empty() {
            return Ok(task);
        }
        let updated = self.tasks.update_fields(task_id, &patch).await?;
        tracing::info!(task_id = %task_id, status = updated.status().as_str(), "task updated");
        Ok(updated)
    }

    /// Deletes a task in a project the caller owns.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] when the task is invisible
    /// and [`TaskServiceError::NotOwner`] when the caller is only a member.
    pub async fn delete_task(&self, user_id: UserId, task_id: TaskId) -> TaskServiceResult<()> {
        let (_, grant) = self.visible_task(user_id, task_id).await?;
        require_owner(user_id, &grant)?;
        self.tasks.delete(task_id).await?;
        tracing::info!(task_id = %task_id, "task deleted");
        Ok(())
    }

    /// Returns tasks due on `date` across every project the caller can read.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when the day cannot be
    /// represented and storage errors when resolution or lookup fails.
    pub async fn tasks_by_date(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> TaskServiceResult<Vec<Task>> {
        let window = self.calendar.day(date)?;
        self.accessible_tasks(user_id, TaskFilter::due_within(window))
            .await
    }

    /// Returns tasks due from the start of `from` through the end of `to`
    /// across every project the caller can read.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] when `from` is after `to` or a
    /// boundary cannot be represented.
    pub async fn tasks_by_range(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaskServiceResult<Vec<Task>> {
        let window = self.calendar.range(from, to)?;
        self.accessible_tasks(user_id, TaskFilter::due_within(window))
            .await
    }

    /// Counts tasks across every project the caller can read.
    ///
    /// # Errors
    ///
    /// Returns storage errors when resolution or counting fails.
    pub async fn stats(&self, user_id: UserId) -> TaskServiceResult<TaskStats> {
        let project_ids: Vec<ProjectId> = self.access.resolve(user_id).await?.into_iter().collect();
        if project_ids.is_empty() {
            return Ok(TaskStats::default());
        }
        let now = self.clock.utc();
        let today = self.calendar.today(now)?;

        let stats = TaskStats {
            total: self.tasks.count(&project_ids, &TaskFilter::all()).await?,
            done: self
                .tasks
                .count(&project_ids, &TaskFilter::with_status(TaskStatus::Done))
                .await?,
            overdue: self
                .tasks
                .count(&project_ids, &TaskFilter::overdue_at(now))
                .await?,
            today: self
                .tasks
                .count(&project_ids, &TaskFilter::due_within(today))
                .await?,
        };
        tracing::debug!(
            user_id = %user_id,
            projects = project_ids.len(),
            total = stats.total,
            done = stats.done,
            overdue = stats.overdue,
            today = stats.today,
            "computed task stats"
        );
        Ok(stats)
    }

    async fn accessible_tasks(
        &self,
        user_id: UserId,
        filter: TaskFilter,
    ) -> TaskServiceResult<Vec<Task>> {
        let project_ids: Vec<ProjectId> = self.access.resolve(user_id).await?.into_iter().collect();
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let tasks = self.tasks.find_by_projects(&project_ids, &filter).await?;
        tracing::debug!(
            user_id = %user_id,
            projects = project_ids.len(),
            returned = tasks.len(),
            "queried accessible tasks"
        );
        Ok(tasks)
    }

    async fn owned_project(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> TaskServiceResult<ProjectGrant> {
        let grant = self
            .access
            .authorize(user_id, project_id)
            .await?
            .ok_or(TaskServiceError::ProjectNotFound(project_id))?;
        require_owner(user_id, &grant)?;
        Ok(grant)
    }

    async fn visible_task(
        &self,
        user_id: UserId,
        task_id: TaskId,
    ) -> TaskServiceResult<(Task, ProjectGrant)> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;
        let grant = self
            .access
            .authorize(user_id, task.project_id())
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;
        Ok((task, grant))
    }
}

fn require_owner(user_id: UserId, grant: &ProjectGrant) -> TaskServiceResult<()> {
    if grant.is_owner() {
        return Ok(());
    }
    Err(TaskServiceError::NotOwner {
        user_id,
        project_id: grant.project.id(),
    })
}
