//! In-memory adapters for project storage ports.

mod membership;
mod project;
mod user;

pub use membership::InMemoryMembershipRepository;
pub use project::InMemoryProjectRepository;
pub use user::InMemoryUserDirectory;

/// Converts a poisoned lock into an I/O error suitable for persistence
/// variants.
fn lock_error(err: &impl ToString) -> std::io::Error {
    std::io::Error::other(err.to_string())
}
