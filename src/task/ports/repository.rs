//! Repository port for task persistence and filtered lookup.

use crate::project::domain::ProjectId;
use crate::task::domain::{Pagination, Task, TaskFilter, TaskId, TaskPatch};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns tasks in any of `project_ids` that match `filter`, ordered by
    /// due date then identifier. Tasks without a due date come last.
    async fn find_by_projects(
        &self,
        project_ids: &[ProjectId],
        filter: &TaskFilter,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns one page of a project's tasks.
    async fn list_project_page(
        &self,
        project_id: ProjectId,
        pagination: &Pagination,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Counts tasks in any of `project_ids` that match `filter`.
    async fn count(
        &self,
        project_ids: &[ProjectId],
        filter: &TaskFilter,
    ) -> TaskRepositoryResult<u64>;

    /// Applies a partial update and returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> TaskRepositoryResult<Task>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Deletes every task of a project and returns how many were removed.
    async fn delete_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
