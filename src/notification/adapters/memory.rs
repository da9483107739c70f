//! In-memory notifier that records deliveries.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::RenderedEmail,
    ports::{Notifier, NotifierError, NotifierResult},
};

/// Thread-safe notifier that keeps every delivered email.
///
/// A failing recorder rejects every message, which exercises the
/// dispatcher's failure accounting.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<RenderedEmail>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Creates a recorder that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that rejects every message.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// Returns the emails delivered so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<RenderedEmail> {
        self.sent
            .read()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Returns the emails delivered to `recipient`.
    #[must_use]
    pub fn sent_to(&self, recipient: &str) -> Vec<RenderedEmail> {
        self.sent()
            .into_iter()
            .filter(|email| email.to == recipient)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &RenderedEmail) -> NotifierResult<()> {
        if self.fail {
            return Err(NotifierError::Rejected {
                recipient: email.to.clone(),
                reason: "recorder configured to fail".to_owned(),
            });
        }
        let mut sent = self
            .sent
            .write()
            .map_err(|err| NotifierError::unavailable(std::io::Error::other(err.to_string())))?;
        sent.push(email.clone());
        Ok(())
    }
}
