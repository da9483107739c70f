//! Port contracts for notification delivery.

pub mod notifier;

pub use notifier::{Notifier, NotifierError, NotifierResult};

#[cfg(test)]
pub use notifier::MockNotifier;
