//! Domain model for project tasks and their aggregated views.
//!
//! Tasks always belong to one project. Queries are described by value types
//! ([`TaskFilter`], [`Pagination`]) so every storage backend evaluates the
//! same semantics, and day boundaries are computed by a [`Calendar`] bound
//! to an explicit UTC offset.

mod calendar;
mod error;
mod ids;
mod query;
mod stats;
mod task;

pub use calendar::{Calendar, DueWindow};
pub use error::TaskDomainError;
pub use ids::{TaskId, TaskTitle};
pub use query::{
    DueDateFilter, Pagination, SortDirection, StatusFilter, TaskFilter, TaskOrder,
};
pub use stats::TaskStats;
pub use task::{PersistedTaskData, Task, TaskPatch, TaskPriority, TaskStatus};
