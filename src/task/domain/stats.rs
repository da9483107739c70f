//! Completion statistics over a set of tasks.

use serde::{Deserialize, Serialize};

/// Task counts for a user's accessible projects.
///
/// `overdue` counts unfinished tasks due before the evaluation instant;
/// `today` counts tasks due on the current calendar day regardless of
/// status, so a task can contribute to both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// All tasks.
    pub total: u64,
    /// Tasks with status `done`.
    pub done: u64,
    /// Unfinished tasks past their due date.
    pub overdue: u64,
    /// Tasks due today.
    pub today: u64,
}

impl TaskStats {
    /// Returns the number of unfinished tasks.
    #[must_use]
    pub const fn open(&self) -> u64 {
        self.total.saturating_sub(self.done)
    }
}
