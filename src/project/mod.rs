//! Projects, memberships and access resolution for Flowday.
//!
//! This module owns the single authorization primitive of the crate: the set
//! of projects a user may read, derived from project ownership plus accepted
//! memberships. It also implements the invitation lifecycle that creates
//! those memberships. The module follows hexagonal architecture:
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
