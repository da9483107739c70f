//! Day boundaries under a fixed UTC offset.

use super::TaskDomainError;
use crate::config::CalendarConfig;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};

/// Half-open interval `[start, end)` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DueWindow {
    /// Creates a window; `end` is exclusive.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Maps calendar dates to instants using a configured UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::from_config(CalendarConfig::default())
    }
}

impl Calendar {
    /// Creates a calendar with the given offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a calendar from configuration.
    #[must_use]
    pub const fn from_config(config: CalendarConfig) -> Self {
        Self::new(config.utc_offset)
    }

    /// Returns the calendar date containing `now`.
    #[must_use]
    pub fn date_of(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Returns the instant at which `date` begins.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DateOutOfRange`] when local midnight of
    /// `date` has no UTC representation.
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TaskDomainError> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let offset = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        local_midnight
            .checked_sub_signed(offset)
            .map(|instant| instant.and_utc())
            .ok_or(TaskDomainError::DateOutOfRange(date))
    }

    /// Returns the window covering `date`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DateOutOfRange`] when either boundary of
    /// the day falls outside the representable range.
    pub fn day(&self, date: NaiveDate) -> Result<DueWindow, TaskDomainError> {
        let next = date
            .succ_opt()
            .ok_or(TaskDomainError::DateOutOfRange(date))?;
        Ok(DueWindow::new(
            self.start_of_day(date)?,
            self.start_of_day(next)?,
        ))
    }

    /// Returns the window covering every day from `from` to `to` inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvertedRange`] when `from` is after `to`
    /// and [`TaskDomainError::DateOutOfRange`] when a boundary cannot be
    /// represented.
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> Result<DueWindow, TaskDomainError> {
        if from > to {
            return Err(TaskDomainError::InvertedRange { from, to });
        }
        let last = self.day(to)?;
        Ok(DueWindow::new(self.start_of_day(from)?, last.end()))
    }

    /// Returns the window covering the day that contains `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DateOutOfRange`] when `now` falls on a day
    /// whose boundaries cannot be represented.
    pub fn today(&self, now: DateTime<Utc>) -> Result<DueWindow, TaskDomainError> {
        self.day(self.date_of(now))
    }
}
