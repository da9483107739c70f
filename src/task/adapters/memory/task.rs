//! In-memory task repository.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::project::domain::ProjectId;
use crate::task::{
    domain::{Pagination, Task, TaskFilter, TaskId, TaskPatch},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    project_index: HashMap<ProjectId, BTreeSet<TaskId>>,
}

impl InMemoryTaskState {
    fn tasks_in<'a>(&'a self, project_id: &ProjectId) -> impl Iterator<Item = &'a Task> + 'a {
        self.project_index
            .get(project_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.tasks.get(id))
    }

    fn matching(&self, project_ids: &[ProjectId], filter: &TaskFilter) -> Vec<&Task> {
        let unique: HashSet<&ProjectId> = project_ids.iter().collect();
        unique
            .into_iter()
            .flat_map(|project_id| self.tasks_in(project_id))
            .filter(|task| filter.matches(task))
            .collect()
    }

    fn remove(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.remove(&id)?;
        if let Some(ids) = self.project_index.get_mut(&task.project_id()) {
            ids.remove(&id);
            if ids.is_empty() {
                self.project_index.remove(&task.project_id());
            }
        }
        Some(task)
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: &impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn by_due_date(left: &Task, right: &Task) -> Ordering {
    match (left.due_date(), right.due_date()) {
        (Some(left_due), Some(right_due)) => left_due.cmp(&right_due),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| left.id().cmp(&right.id()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state
            .project_index
            .entry(task.project_id())
            .or_default()
            .insert(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_projects(
        &self,
        project_ids: &[ProjectId],
        filter: &TaskFilter,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let mut tasks: Vec<Task> = state
            .matching(project_ids, filter)
            .into_iter()
            .cloned()
            .collect();
        tasks.sort_by(by_due_date);
        Ok(tasks)
    }

    async fn list_project_page(
        &self,
        project_id: ProjectId,
        pagination: &Pagination,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let tasks = state.tasks_in(&project_id).cloned().collect();
        Ok(pagination.apply(tasks))
    }

    async fn count(
        &self,
        project_ids: &[ProjectId],
        filter: &TaskFilter,
    ) -> TaskRepositoryResult<u64> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let matching = state.matching(project_ids, filter).len();
        u64::try_from(matching).map_err(TaskRepositoryError::persistence)
    }

    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        task.apply(patch);
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state
            .remove(id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<u64> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let ids: Vec<TaskId> = state
            .project_index
            .get(&project_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        let removed = ids
            .into_iter()
            .filter(|id| state.remove(*id).is_some())
            .count();
        u64::try_from(removed).map_err(TaskRepositoryError::persistence)
    }
}
