//! Port contracts for project, membership and user storage.
//!
//! Ports define infrastructure-agnostic interfaces used by the access
//! resolver and the invitation services. Document and relational backends
//! both satisfy the same traits, so authorization logic is written once.

pub mod membership_repository;
pub mod project_repository;
pub mod user_directory;

pub use membership_repository::{
    MembershipRepository, MembershipRepositoryError, MembershipRepositoryResult,
};
pub use project_repository::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult};
pub use user_directory::{UserDirectory, UserDirectoryError, UserDirectoryResult};

#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
