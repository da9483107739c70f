//! Port contracts for task storage.
//!
//! Ports define infrastructure-agnostic interfaces used by the aggregation
//! service. Filters and pagination are passed as domain values so each
//! backend evaluates identical semantics.

pub mod repository;

pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};

#[cfg(test)]
pub use repository::MockTaskRepository;
