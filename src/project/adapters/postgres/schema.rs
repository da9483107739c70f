//! Diesel schema for project persistence.

diesel::table! {
    /// Registered users.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Normalized, unique email address.
        #[max_length = 320]
        email -> Varchar,
    }
}

diesel::table! {
    /// Projects and their owners.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Owning user.
        owner_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Invitation and membership records.
    project_members (id) {
        /// Membership identifier.
        id -> Uuid,
        /// Project the record belongs to.
        project_id -> Uuid,
        /// Invited or member user.
        user_id -> Uuid,
        /// Membership role.
        #[max_length = 20]
        role -> Varchar,
        /// Invitation status.
        #[max_length = 20]
        status -> Varchar,
        /// SHA-256 digest of the invitation token.
        #[max_length = 64]
        token_digest -> Nullable<Varchar>,
        /// Invitation timestamp.
        invited_at -> Timestamptz,
        /// Acceptance timestamp.
        accepted_at -> Nullable<Timestamptz>,
    }
}
