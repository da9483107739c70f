//! Flowday: project-scoped task tracking with shared access.
//!
//! This crate provides the authorization core behind Flowday: resolving which
//! projects a user may see, the invitation lifecycle that grants membership,
//! and the task views (per project, per day, per date range, statistics) that
//! are all computed over the same resolved access set.
//!
//! # Architecture
//!
//! Flowday follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and notification
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`,
//!   logging)
//!
//! # Modules
//!
//! - [`project`]: Users, projects, memberships, access resolution and invitations
//! - [`task`]: Task CRUD and the by-date, by-range and statistics views
//! - [`notification`]: Invitation and rejection notices with bounded dispatch
//! - [`config`]: Explicit runtime configuration
//! - [`error`]: Caller-facing error taxonomy shared by all services

pub mod config;
pub mod error;
pub mod notification;
pub mod project;
pub mod task;

#[cfg(test)]
mod test_support;
