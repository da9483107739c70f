//! Notification payloads and template rendering.

use super::NotificationError;
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

const INVITATION_TEMPLATE: &str = "invitation.html";
const REJECTION_TEMPLATE: &str = "rejection.html";

const INVITATION_SUBJECT: &str = "Project Invitation - {{ project_name }}";
const INVITATION_BODY: &str = r#"<html>
<body>
  <h2>You've been invited to collaborate!</h2>
  <p>You have been invited to join the project: <strong>{{ project_name }}</strong></p>
  <p>Click the link below to view and accept your invitation:</p>
  <p><a href="{{ acceptance_link }}">View Invitation</a></p>
  <p>Or copy this link: {{ acceptance_link }}</p>
  <p>If you didn't expect this invitation, you can safely ignore this email.</p>
</body>
</html>"#;

const REJECTION_SUBJECT: &str = "Invitation Rejected - {{ project_name }}";
const REJECTION_BODY: &str = r"<html>
<body>
  <h2>Invitation Rejected</h2>
  <p>Hello,</p>
  <p><strong>{{ rejecting_user_email }}</strong> has declined your invitation to join the project: <strong>{{ project_name }}</strong>.</p>
  <p>This is an automated notification.</p>
</body>
</html>";

/// A notification requested by the invitation state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Tells an invitee about a pending invitation.
    Invitation {
        /// Invitee address.
        to: String,
        /// Name of the project the invitee may join.
        project_name: String,
        /// Link carrying the plaintext acceptance token.
        acceptance_link: String,
    },
    /// Tells a project owner that an invitee declined.
    RejectionNotice {
        /// Owner address.
        owner_email: String,
        /// Name of the project.
        project_name: String,
        /// Address of the user who declined.
        rejecting_user_email: String,
    },
}

/// An email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

impl Notification {
    /// Returns the recipient address.
    #[must_use]
    pub fn recipient(&self) -> &str {
        match self {
            Self::Invitation { to, .. } => to,
            Self::RejectionNotice { owner_email, .. } => owner_email,
        }
    }

    /// Returns a short label for log events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Invitation { .. } => "invitation",
            Self::RejectionNotice { .. } => "rejection_notice",
        }
    }

    /// Renders the notification into an email.
    ///
    /// Bodies are HTML-escaped, so project names cannot inject markup.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Render`] when a template fails to render.
    pub fn render(&self) -> Result<RenderedEmail, NotificationError> {
        let (name, subject_source, body_source, ctx) = match self {
            Self::Invitation {
                project_name,
                acceptance_link,
                ..
            } => (
                INVITATION_TEMPLATE,
                INVITATION_SUBJECT,
                INVITATION_BODY,
                context! { project_name, acceptance_link },
            ),
            Self::RejectionNotice {
                project_name,
                rejecting_user_email,
                ..
            } => (
                REJECTION_TEMPLATE,
                REJECTION_SUBJECT,
                REJECTION_BODY,
                context! { project_name, rejecting_user_email },
            ),
        };

        let render_error = |err: minijinja::Error| NotificationError::Render {
            template: name,
            reason: err.to_string(),
        };

        let mut environment = Environment::new();
        environment
            .add_template(name, body_source)
            .map_err(render_error)?;
        let html_body = environment
            .get_template(name)
            .and_then(|template| template.render(&ctx))
            .map_err(render_error)?;
        let subject = environment
            .render_str(subject_source, &ctx)
            .map_err(render_error)?;

        Ok(RenderedEmail {
            to: self.recipient().to_owned(),
            subject,
            html_body,
        })
    }
}
