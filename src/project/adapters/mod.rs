//! Adapter implementations for project, membership and user ports.

pub mod memory;
pub mod postgres;
