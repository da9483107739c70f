//! Notification messages and their rendered email form.

mod error;
mod message;

pub use error::NotificationError;
pub use message::{Notification, RenderedEmail};
