//! Notifier that writes deliveries to the tracing log.

use async_trait::async_trait;
use tracing::info;

use crate::notification::{
    domain::RenderedEmail,
    ports::{Notifier, NotifierResult},
};

/// Notifier that logs each email instead of sending it.
///
/// Useful for development setups without a mail transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    /// Creates a logging notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, email: &RenderedEmail) -> NotifierResult<()> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body_len = email.html_body.len(),
            "email delivered to log"
        );
        Ok(())
    }
}
