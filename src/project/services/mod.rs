//! Application services for access resolution, invitations and projects.

mod access;
mod invitation;
mod projects;

pub use access::{AccessError, AccessResolver, AccessResult, ProjectAccess, ProjectGrant};
pub use invitation::{InvitationError, InvitationResult, InvitationService, PendingInvitation};
pub use projects::{ProjectService, ProjectServiceError, ProjectServiceResult};
