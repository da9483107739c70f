//! Background notification dispatch.

mod dispatcher;

pub use dispatcher::{DispatchSnapshot, DispatcherHandle, NotificationDispatcher};
