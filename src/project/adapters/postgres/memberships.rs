//! `PostgreSQL` repository implementation for invitation and membership
//! records.

use super::{models::MemberRow, projects::ProjectPgPool, schema::project_members};
use crate::project::{
    domain::{
        MembershipId, MembershipRole, MembershipStatus, PersistedMemberData, ProjectId,
        ProjectMember, TokenDigest, UserId,
    },
    ports::{MembershipRepository, MembershipRepositoryError, MembershipRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const PAIR_UNIQUE_INDEX: &str = "idx_project_members_pair_unique";

/// `PostgreSQL`-backed membership repository.
///
/// Pair uniqueness is enforced by a unique index on
/// `(project_id, user_id)`, so concurrent invitations resolve to exactly one
/// stored record.
#[derive(Debug, Clone)]
pub struct PostgresMembershipRepository {
    pool: ProjectPgPool,
}

impl PostgresMembershipRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ProjectPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> MembershipRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MembershipRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(MembershipRepositoryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(MembershipRepositoryError::persistence)?
    }

    async fn load_where<F>(&self, query: F) -> MembershipRepositoryResult<Vec<ProjectMember>>
    where
        F: FnOnce(
                project_members::BoxedQuery<'static, diesel::pg::Pg>,
            ) -> project_members::BoxedQuery<'static, diesel::pg::Pg>
            + Send
            + 'static,
    {
        self.run_blocking(move |connection| {
            let rows = query(project_members::table.into_boxed())
                .order((project_members::invited_at.asc(), project_members::id.asc()))
                .select(MemberRow::as_select())
                .load::<MemberRow>(connection)
                .map_err(MembershipRepositoryError::persistence)?;
            rows.into_iter().map(row_to_member).collect()
        })
        .await
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn insert(&self, member: &ProjectMember) -> MembershipRepositoryResult<()> {
        let project_id = member.project_id();
        let user_id = member.user_id();
        let row = to_row(member);

        self.run_blocking(move |connection| {
            diesel::insert_into(project_members::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_pair_unique_violation(info.as_ref()) =>
                    {
                        MembershipRepositoryError::DuplicateMembership {
                            project_id,
                            user_id,
                        }
                    }
                    _ => MembershipRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_pair(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        self.run_blocking(move |connection| {
            let row = project_members::table
                .filter(project_members::project_id.eq(project_id.into_inner()))
                .filter(project_members::user_id.eq(user_id.into_inner()))
                .select(MemberRow::as_select())
                .first::<MemberRow>(connection)
                .optional()
                .map_err(MembershipRepositoryError::persistence)?;
            row.map(row_to_member).transpose()
        })
        .await
    }

    async fn find_pending_by_token(
        &self,
        digest: &TokenDigest,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        let digest_hex = digest.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = project_members::table
                .filter(project_members::token_digest.eq(&digest_hex))
                .filter(project_members::status.eq(MembershipStatus::Pending.as_str()))
                .select(MemberRow::as_select())
                .first::<MemberRow>(connection)
                .optional()
                .map_err(MembershipRepositoryError::persistence)?;
            row.map(row_to_member).transpose()
        })
        .await
    }

    async fn find_accepted_by_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        self.load_where(move |query| {
            query
                .filter(project_members::user_id.eq(user_id.into_inner()))
                .filter(project_members::status.eq(MembershipStatus::Accepted.as_str()))
        })
        .await
    }

    async fn find_pending_by_user(
        &self,
        user_id: UserId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        self.load_where(move |query| {
            query
                .filter(project_members::user_id.eq(user_id.into_inner()))
                .filter(project_members::status.eq(MembershipStatus::Pending.as_str()))
        })
        .await
    }

    async fn find_accepted_by_project(
        &self,
        project_id: ProjectId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        self.load_where(move |query| {
            query
                .filter(project_members::project_id.eq(project_id.into_inner()))
                .filter(project_members::status.eq(MembershipStatus::Accepted.as_str()))
        })
        .await
    }

    async fn accept_pending(
        &self,
        id: MembershipId,
        accepted_at: DateTime<Utc>,
    ) -> MembershipRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                project_members::table
                    .filter(project_members::id.eq(id.into_inner()))
                    .filter(project_members::status.eq(MembershipStatus::Pending.as_str())),
            )
            .set((
                project_members::status.eq(MembershipStatus::Accepted.as_str()),
                project_members::accepted_at.eq(Some(accepted_at)),
            ))
            .execute(connection)
            .map_err(MembershipRepositoryError::persistence)?;

            if updated == 0 {
                return Err(MembershipRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_pending(&self, id: MembershipId) -> MembershipRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                project_members::table
                    .filter(project_members::id.eq(id.into_inner()))
                    .filter(project_members::status.eq(MembershipStatus::Pending.as_str())),
            )
            .execute(connection)
            .map_err(MembershipRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_by_pair(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> MembershipRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                project_members::table
                    .filter(project_members::project_id.eq(project_id.into_inner()))
                    .filter(project_members::user_id.eq(user_id.into_inner())),
            )
            .execute(connection)
            .map_err(MembershipRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> MembershipRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                project_members::table
                    .filter(project_members::project_id.eq(project_id.into_inner())),
            )
            .execute(connection)
            .map_err(MembershipRepositoryError::persistence)?;
            u64::try_from(deleted).map_err(MembershipRepositoryError::persistence)
        })
        .await
    }
}

fn to_row(member: &ProjectMember) -> MemberRow {
    MemberRow {
        id: member.id().into_inner(),
        project_id: member.project_id().into_inner(),
        user_id: member.user_id().into_inner(),
        role: member.role().as_str().to_owned(),
        status: member.status().as_str().to_owned(),
        token_digest: member.token_digest().map(|digest| digest.as_str().to_owned()),
        invited_at: member.invited_at(),
        accepted_at: member.accepted_at(),
    }
}

fn row_to_member(row: MemberRow) -> MembershipRepositoryResult<ProjectMember> {
    let role =
        MembershipRole::try_from(row.role.as_str()).map_err(MembershipRepositoryError::persistence)?;
    let status = MembershipStatus::try_from(row.status.as_str())
        .map_err(MembershipRepositoryError::persistence)?;
    let token_digest = row
        .token_digest
        .map(TokenDigest::from_hex)
        .transpose()
        .map_err(MembershipRepositoryError::persistence)?;

    Ok(ProjectMember::from_persisted(PersistedMemberData {
        id: MembershipId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        user_id: UserId::from_uuid(row.user_id),
        role,
        status,
        token_digest,
        invited_at: row.invited_at,
        accepted_at: row.accepted_at,
    }))
}

fn is_pair_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == PAIR_UNIQUE_INDEX)
}
