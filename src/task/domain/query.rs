//! Backend-neutral task filters and pagination.

use super::{DueWindow, Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

/// Constraint on a task's due date.
///
/// Every variant except [`DueDateFilter::Any`] excludes tasks without a due
/// date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueDateFilter {
    /// No constraint.
    #[default]
    Any,
    /// Due date inside a half-open window.
    Within(DueWindow),
    /// Due date strictly before an instant.
    Before(DateTime<Utc>),
}

/// Constraint on a task's status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// No constraint.
    #[default]
    Any,
    /// Status equals the value.
    Is(TaskStatus),
    /// Status differs from the value.
    IsNot(TaskStatus),
}

/// Combined task filter evaluated by repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Due-date constraint.
    pub due: DueDateFilter,
    /// Status constraint.
    pub status: StatusFilter,
}

impl TaskFilter {
    /// Matches every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches tasks due inside `window`.
    #[must_use]
    pub fn due_within(window: DueWindow) -> Self {
        Self {
            due: DueDateFilter::Within(window),
            status: StatusFilter::Any,
        }
    }

    /// Matches tasks in `status`.
    #[must_use]
    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            due: DueDateFilter::Any,
            status: StatusFilter::Is(status),
        }
    }

    /// Matches unfinished tasks due before `now`.
    #[must_use]
    pub fn overdue_at(now: DateTime<Utc>) -> Self {
        Self {
            due: DueDateFilter::Before(now),
            status: StatusFilter::IsNot(TaskStatus::Done),
        }
    }

    /// Evaluates the filter against a task.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let due_matches = match self.due {
            DueDateFilter::Any => true,
            DueDateFilter::Within(window) => task.due_date().is_some_and(|due| window.contains(due)),
            DueDateFilter::Before(instant) => task.due_date().is_some_and(|due| due < instant),
        };
        let status_matches = match self.status {
            StatusFilter::Any => true,
            StatusFilter::Is(status) => task.status() == status,
            StatusFilter::IsNot(status) => task.status() != status,
        };
        due_matches && status_matches
    }
}

/// Sortable task columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOrder {
    /// Creation time.
    #[default]
    CreatedAt,
    /// Due date; tasks without one sort last.
    DueDate,
    /// Priority rank.
    Priority,
    /// Status label.
    Status,
}

impl TaskOrder {
    /// Parses a column name, falling back to [`TaskOrder::CreatedAt`] for
    /// anything outside the whitelist.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("due_date") => Self::DueDate,
            Some("priority") => Self::Priority,
            Some("status") => Self::Status,
            _ => Self::CreatedAt,
        }
    }

    /// Returns the column name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::Status => "status",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortDirection {
    /// Parses a direction, falling back to [`SortDirection::Desc`].
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Normalized page request for listing a project's tasks.
///
/// Construction never fails: out-of-range values fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    limit: u32,
    offset: u64,
    order: TaskOrder,
    direction: SortDirection,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            order: TaskOrder::default(),
            direction: SortDirection::default(),
        }
    }
}

impl Pagination {
    /// Normalizes raw query values.
    ///
    /// A `limit` outside `1..=100` becomes 20, a negative `offset` becomes 0,
    /// and unknown `order` or `dir` values become `created_at` and `desc`.
    #[must_use]
    pub fn from_raw(
        limit: Option<i64>,
        offset: Option<i64>,
        order: Option<&str>,
        direction: Option<&str>,
    ) -> Self {
        Self {
            limit: limit
                .and_then(|value| u32::try_from(value).ok())
                .filter(|value| (1..=MAX_LIMIT).contains(value))
                .unwrap_or(DEFAULT_LIMIT),
            offset: offset
                .and_then(|value| u64::try_from(value).ok())
                .unwrap_or(0),
            order: TaskOrder::parse_or_default(order),
            direction: SortDirection::parse_or_default(direction),
        }
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of tasks skipped.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the sort column.
    #[must_use]
    pub const fn order(&self) -> TaskOrder {
        self.order
    }

    /// Returns the sort direction.
    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Compares two tasks in page order.
    ///
    /// Ties on the sort column are broken by task identifier in the same
    /// direction. Tasks without a due date sort last in both directions
    /// when ordering by due date.
    #[must_use]
    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        let directed = |ordering: Ordering| match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        let primary = match self.order {
            TaskOrder::CreatedAt => directed(left.created_at().cmp(&right.created_at())),
            TaskOrder::Priority => {
                directed(left.priority().rank().cmp(&right.priority().rank()))
            }
            TaskOrder::Status => directed(left.status().as_str().cmp(right.status().as_str())),
            TaskOrder::DueDate => match (left.due_date(), right.due_date()) {
                (Some(left_due), Some(right_due)) => directed(left_due.cmp(&right_due)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| directed(left.id().cmp(&right.id())))
    }

    /// Applies ordering, offset and limit to an in-memory task list.
    #[must_use]
    pub fn apply(&self, mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by(|left, right| self.compare(left, right));
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        tasks.into_iter().skip(offset).take(limit).collect()
    }
}
