//! Diesel row models for project persistence.

use super::schema::{project_members, projects, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert row for users.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Normalized email address.
    pub email: String,
}

/// Query and insert row for projects.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Owning user.
    pub owner_id: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query and insert row for membership records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    /// Membership identifier.
    pub id: uuid::Uuid,
    /// Project identifier.
    pub project_id: uuid::Uuid,
    /// Member identifier.
    pub user_id: uuid::Uuid,
    /// Role label.
    pub role: String,
    /// Status label.
    pub status: String,
    /// Token digest, hex encoded.
    pub token_digest: Option<String>,
    /// Invitation timestamp.
    pub invited_at: DateTime<Utc>,
    /// Acceptance timestamp.
    pub accepted_at: Option<DateTime<Utc>>,
}
