//! In-memory project repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::lock_error;
use crate::project::{
    domain::{Project, ProjectId, UserId},
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};

/// Thread-safe in-memory project repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    state: Arc<RwLock<HashMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by_key(|project| (project.created_at(), project.id()));
    projects
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ProjectRepositoryError::persistence(lock_error(&err)))?;
        if state.contains_key(&project.id()) {
            return Err(ProjectRepositoryError::DuplicateProject(project.id()));
        }
        state.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        let state = self
            .state
            .read()
            .map_err(|err| ProjectRepositoryError::persistence(lock_error(&err)))?;
        Ok(state.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self
            .state
            .read()
            .map_err(|err| ProjectRepositoryError::persistence(lock_error(&err)))?;
        let owned = state
            .values()
            .filter(|project| project.is_owned_by(owner_id))
            .cloned()
            .collect();
        Ok(oldest_first(owned))
    }

    async fn find_by_ids(&self, ids: &[ProjectId]) -> ProjectRepositoryResult<Vec<Project>> {
        let state = self
            .state
            .read()
            .map_err(|err| ProjectRepositoryError::persistence(lock_error(&err)))?;
        let found = ids.iter().filter_map(|id| state.get(id).cloned()).collect();
        let mut projects = oldest_first(found);
        projects.dedup_by_key(|project| project.id());
        Ok(projects)
    }

    async fn delete(&self, id: ProjectId) -> ProjectRepositoryResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ProjectRepositoryError::persistence(lock_error(&err)))?;
        state
            .remove(&id)
            .map(|_| ())
            .ok_or(ProjectRepositoryError::NotFound(id))
    }
}
