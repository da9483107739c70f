//! Domain model for projects, users and memberships.
//!
//! Project ownership is immutable and lives on the project itself. Membership
//! records only describe invited users; the owner never needs one.

mod error;
mod ids;
mod member;
mod project;
mod token;
mod user;

pub use error::{ParseMembershipError, ProjectDomainError};
pub use ids::{MembershipId, ProjectId, UserId};
pub use member::{MembershipRole, MembershipStatus, PersistedMemberData, ProjectMember};
pub use project::{PersistedProjectData, Project, ProjectName};
pub use token::{InvitationToken, TokenDigest};
pub use user::{EmailAddress, User};
