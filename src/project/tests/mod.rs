//! Unit tests for the project context.

mod membership_store_tests;
