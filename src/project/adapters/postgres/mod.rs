//! `PostgreSQL` adapters for projects, memberships and users.

mod memberships;
mod models;
mod projects;
mod schema;
mod users;

pub use memberships::PostgresMembershipRepository;
pub use projects::{PostgresProjectRepository, ProjectPgPool};
pub use users::PostgresUserDirectory;
