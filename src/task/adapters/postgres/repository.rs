//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::project::domain::ProjectId;
use crate::task::{
    domain::{
        DueDateFilter, Pagination, PersistedTaskData, SortDirection, StatusFilter, Task,
        TaskFilter, TaskId, TaskOrder, TaskPatch, TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_projects(
        &self,
        project_ids: &[ProjectId],
        filter: &TaskFilter,
    ) -> TaskRepositoryResult<Vec<Task>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = to_uuids(project_ids);
        let criteria = *filter;
        self.run_blocking(move |connection| {
            let rows = filtered(ids, &criteria)
                .order((tasks::due_date.asc().nulls_last(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_project_page(
        &self,
        project_id: ProjectId,
        pagination: &Pagination,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let page = *pagination;
        let offset = i64::try_from(page.offset()).map_err(TaskRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let query = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .into_boxed();
            let rows = ordered(query, &page)
                .limit(i64::from(page.limit()))
                .offset(offset)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn count(
        &self,
        project_ids: &[ProjectId],
        filter: &TaskFilter,
    ) -> TaskRepositoryResult<u64> {
        if project_ids.is_empty() {
            return Ok(0);
        }
        let ids = to_uuids(project_ids);
        let criteria = *filter;
        self.run_blocking(move |connection| {
            let total = filtered(ids, &criteria)
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            u64::try_from(total).map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> TaskRepositoryResult<Task> {
        if patch.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or(TaskRepositoryError::NotFound(id));
        }
        let changeset = to_changeset(patch);
        self.run_blocking(move |connection| {
            let row = diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set(&changeset)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task)
                .transpose()?
                .ok_or(TaskRepositoryError::NotFound(id))
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let deleted =
                diesel::delete(tasks::table.filter(tasks::project_id.eq(project_id.into_inner())))
                    .execute(connection)
                    .map_err(TaskRepositoryError::persistence)?;
            u64::try_from(deleted).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

fn to_uuids(project_ids: &[ProjectId]) -> Vec<uuid::Uuid> {
    project_ids.iter().map(|id| id.into_inner()).collect()
}

fn filtered(project_ids: Vec<uuid::Uuid>, filter: &TaskFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table
        .filter(tasks::project_id.eq_any(project_ids))
        .into_boxed();
    query = match filter.due {
        DueDateFilter::Any => query,
        DueDateFilter::Within(window) => query
            .filter(tasks::due_date.ge(window.start()))
            .filter(tasks::due_date.lt(window.end())),
        DueDateFilter::Before(instant) => query.filter(tasks::due_date.lt(instant)),
    };
    match filter.status {
        StatusFilter::Any => query,
        StatusFilter::Is(status) => query.filter(tasks::status.eq(status.as_str())),
        StatusFilter::IsNot(status) => query.filter(tasks::status.ne(status.as_str())),
    }
}

fn ordered(
    query: tasks::BoxedQuery<'static, Pg>,
    pagination: &Pagination,
) -> tasks::BoxedQuery<'static, Pg> {
    match (pagination.order(), pagination.direction()) {
        (TaskOrder::CreatedAt, SortDirection::Asc) => query
            .order(tasks::created_at.asc())
            .then_order_by(tasks::id.asc()),
        (TaskOrder::CreatedAt, SortDirection::Desc) => query
            .order(tasks::created_at.desc())
            .then_order_by(tasks::id.desc()),
        (TaskOrder::DueDate, SortDirection::Asc) => query
            .order(tasks::due_date.asc().nulls_last())
            .then_order_by(tasks::id.asc()),
        (TaskOrder::DueDate, SortDirection::Desc) => query
            .order(tasks::due_date.desc().nulls_last())
            .then_order_by(tasks::id.desc()),
        (TaskOrder::Priority, SortDirection::Asc) => query
            .order(tasks::priority.asc())
            .then_order_by(tasks::id.asc()),
        (TaskOrder::Priority, SortDirection::Desc) => query
            .order(tasks::priority.desc())
            .then_order_by(tasks::id.desc()),
        (TaskOrder::Status, SortDirection::Asc) => query
            .order(tasks::status.asc())
            .then_order_by(tasks::id.asc()),
        (TaskOrder::Status, SortDirection::Desc) => query
            .order(tasks::status.desc())
            .then_order_by(tasks::id.desc()),
    }
}

fn to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().rank(),
        due_date: task.due_date(),
        created_at: task.created_at(),
    }
}

fn to_changeset(patch: &TaskPatch) -> TaskChangeset {
    TaskChangeset {
        status: patch.status.map(|status| status.as_str().to_owned()),
        priority: patch.priority.map(TaskPriority::rank),
        description: patch.description.clone(),
        due_date: patch.due_date,
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let title = TaskTitle::new(row.title).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::from_rank(row.priority).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        title,
        description: row.description,
        status,
        priority,
        due_date: row.due_date,
        created_at: row.created_at,
    }))
}
