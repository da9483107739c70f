//! In-memory membership repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::lock_error;
use crate::project::{
    domain::{MembershipId, ProjectId, ProjectMember, TokenDigest, UserId},
    ports::{MembershipRepository, MembershipRepositoryError, MembershipRepositoryResult},
};

/// Thread-safe in-memory membership repository.
///
/// The pair index is checked and updated under the same write lock as the
/// record map, which gives inserts the same atomicity a unique index would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipRepository {
    state: Arc<RwLock<InMemoryMembershipState>>,
}

#[derive(Debug, Default)]
struct InMemoryMembershipState {
    members: HashMap<MembershipId, ProjectMember>,
    pair_index: HashMap<(ProjectId, UserId), MembershipId>,
}

impl InMemoryMembershipState {
    fn remove(&mut self, id: MembershipId) -> bool {
        let Some(member) = self.members.remove(&id) else {
            return false;
        };
        self.pair_index
            .remove(&(member.project_id(), member.user_id()));
        true
    }

    fn matching(&self, predicate: impl Fn(&ProjectMember) -> bool) -> Vec<ProjectMember> {
        let mut found: Vec<ProjectMember> = self
            .members
            .values()
            .filter(|member| predicate(member))
            .cloned()
            .collect();
        found.sort_by_key(|member| (member.invited_at(), member.id().into_inner()));
        found
    }
}

impl InMemoryMembershipRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> MembershipRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryMembershipState>> {
        self.state
            .read()
            .map_err(|err| MembershipRepositoryError::persistence(lock_error(&err)))
    }

    fn write(
        &self,
    ) -> MembershipRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryMembershipState>> {
        self.state
            .write()
            .map_err(|err| MembershipRepositoryError::persistence(lock_error(&err)))
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn insert(&self, member: &ProjectMember) -> MembershipRepositoryResult<()> {
        let mut state = self.write()?;
        let pair = (member.project_id(), member.user_id());
        if state.pair_index.contains_key(&pair) || state.members.contains_key(&member.id()) {
            return Err(MembershipRepositoryError::DuplicateMembership {
                project_id: member.project_id(),
                user_id: member.user_id(),
            });
        }
        state.pair_index.insert(pair, member.id());
        state.members.insert(member.id(), member.clone());
        Ok(())
    }

    async fn find_by_pair(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        let state = self.read()?;
        Ok(state
            .pair_index
            .get(&(project_id, user_id))
            .and_then(|id| state.members.get(id))
            .cloned())
    }

    async fn find_pending_by_token(
        &self,
        digest: &TokenDigest,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        let state = self.read()?;
        Ok(state
            .members
            .values()
            .find(|member| member.is_pending() && member.token_digest() == Some(digest))
            .cloned())
    }

    async fn find_accepted_by_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        let state = self.read()?;
        Ok(state.matching(|member| member.user_id() == user_id && member.is_accepted()))
    }

    async fn find_pending_by_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        let state = self.read()?;
        Ok(state.matching(|member| member.user_id() == user_id && member.is_pending()))
    }

    async fn find_accepted_by_project(
        &self,
        project_id: ProjectId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        let state = self.read()?;
        Ok(state.matching(|member| member.project_id() == project_id && member.is_accepted()))
    }

    async fn accept_pending(
        &self,
        id: MembershipId,
        accepted_at: DateTime<Utc>,
    ) -> MembershipRepositoryResult<()> {
        let mut state = self.write()?;
        let member = state
            .members
            .get_mut(&id)
            .ok_or(MembershipRepositoryError::NotFound(id))?;
        member
            .accept_at(accepted_at)
            .map_err(|_| MembershipRepositoryError::NotFound(id))
    }

    async fn delete_pending(&self, id: MembershipId) -> MembershipRepositoryResult<bool> {
        let mut state = self.write()?;
        let is_pending = state.members.get(&id).is_some_and(ProjectMember::is_pending);
        Ok(is_pending && state.remove(id))
    }

    async fn delete_by_pair(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> MembershipRepositoryResult<bool> {
        let mut state = self.write()?;
        let Some(id) = state.pair_index.get(&(project_id, user_id)).copied() else {
            return Ok(false);
        };
        Ok(state.remove(id))
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> MembershipRepositoryResult<u64> {
        let mut state = self.write()?;
        let ids: Vec<MembershipId> = state
            .members
            .values()
            .filter(|member| member.project_id() == project_id)
            .map(ProjectMember::id)
            .collect();
        let mut removed = 0;
        for id in ids {
            if state.remove(id) {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
