//! Errors raised while preparing notifications.

use thiserror::Error;

/// Errors produced while rendering a notification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// The email template could not be rendered.
    #[error("failed to render {template} template: {reason}")]
    Render {
        /// Template name.
        template: &'static str,
        /// Renderer failure message.
        reason: String,
    },
}
