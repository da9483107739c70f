//! Tasks and their aggregated views for Flowday.
//!
//! Tasks belong to exactly one project. Reads are authorized through the
//! accessible project set computed by
//! [`AccessResolver`](crate::project::services::AccessResolver); writes need
//! project ownership. Besides CRUD the module provides three derived views
//! over the accessible set: tasks due on a date, tasks due within a date
//! range, and completion statistics. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
