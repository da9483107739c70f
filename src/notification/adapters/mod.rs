//! Notifier implementations.

pub mod logging;
pub mod memory;

pub use logging::LoggingNotifier;
pub use memory::RecordingNotifier;
