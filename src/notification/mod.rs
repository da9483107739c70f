//! Best-effort email notifications for invitation events.
//!
//! Invitation and rejection notices are rendered from templates and handed
//! to a bounded background dispatcher. Callers never wait on delivery, and
//! delivery failures are logged and counted rather than surfaced.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
