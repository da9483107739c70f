//! Error types for task domain validation and parsing.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or parsing task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title is {0} characters, maximum is 255")]
    TitleTooLong(usize),

    /// The status label is not one of `todo`, `in_progress` or `done`.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),

    /// The priority label is not one of `low`, `medium` or `high`.
    #[error("unknown task priority: {0}")]
    UnknownPriority(String),

    /// A date range ends before it starts.
    #[error("date range is inverted: {from} is after {to}")]
    InvertedRange {
        /// First day of the range.
        from: NaiveDate,
        /// Last day of the range.
        to: NaiveDate,
    },

    /// A calendar date cannot be converted to an instant.
    #[error("date {0} is outside the supported range")]
    DateOutOfRange(NaiveDate),
}
