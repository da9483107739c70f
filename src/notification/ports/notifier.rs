//! Email delivery port.

use crate::notification::domain::RenderedEmail;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Delivery contract for rendered emails.
///
/// Implementations may be slow or unreliable; the dispatcher calls them from
/// background workers only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one email.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the message could not be delivered.
    async fn send(&self, email: &RenderedEmail) -> NotifierResult<()>;
}

/// Errors returned by notifier implementations.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The transport refused the message.
    #[error("message to {recipient} rejected: {reason}")]
    Rejected {
        /// Recipient address.
        recipient: String,
        /// Transport-supplied reason.
        reason: String,
    },

    /// The transport could not be reached.
    #[error("notification transport unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a transport error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
