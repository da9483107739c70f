//! Unit tests for notification rendering and dispatch.
