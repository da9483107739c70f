//! Runtime configuration for Flowday services.
//!
//! Configuration is an explicit value built once at startup and handed to the
//! services that need it. Nothing in the crate reads the environment on its
//! own after construction.
//!
//! # Environment Variables
//!
//! - `FLOWDAY_INVITATION_BASE_URL`: link target embedded in invitation emails
//!   (default: `http://localhost:5173/app/v1/invitations`)
//! - `FLOWDAY_UTC_OFFSET_MINUTES`: offset used for day boundaries (default: 0)
//! - `FLOWDAY_NOTIFY_WORKERS`: notification worker count (default: 2)
//! - `FLOWDAY_NOTIFY_QUEUE_CAPACITY`: pending notification bound (default: 128)

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

const INVITATION_BASE_URL_KEY: &str = "FLOWDAY_INVITATION_BASE_URL";
const UTC_OFFSET_KEY: &str = "FLOWDAY_UTC_OFFSET_MINUTES";
const NOTIFY_WORKERS_KEY: &str = "FLOWDAY_NOTIFY_WORKERS";
const NOTIFY_CAPACITY_KEY: &str = "FLOWDAY_NOTIFY_QUEUE_CAPACITY";

const DEFAULT_INVITATION_BASE_URL: &str = "http://localhost:5173/app/v1/invitations";
const DEFAULT_NOTIFY_WORKERS: usize = 2;
const DEFAULT_NOTIFY_CAPACITY: usize = 128;
const MINUTES_PER_DAY: i32 = 24 * 60;

/// Errors raised while building configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was present but could not be interpreted.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value that failed to parse.
        value: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Complete Flowday configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowdayConfig {
    /// Invitation link settings.
    pub invitations: InvitationConfig,
    /// Day-boundary settings for calendar views.
    pub calendar: CalendarConfig,
    /// Notification dispatcher sizing.
    pub dispatch: DispatchConfig,
}

/// Invitation link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationConfig {
    /// Base URL that receives the invitation token as a `token` query
    /// parameter.
    pub base_url: String,
}

impl InvitationConfig {
    /// Builds the acceptance link for a plaintext invitation token.
    #[must_use]
    pub fn acceptance_link(&self, token: &str) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}token={token}", self.base_url)
    }
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INVITATION_BASE_URL.to_owned(),
        }
    }
}

/// Day-boundary settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Offset applied when computing "start of day" for a calendar date.
    pub utc_offset: FixedOffset,
}

impl CalendarConfig {
    /// Creates a calendar configuration from an offset in minutes east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the offset is a full day or
    /// more in either direction.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: UTC_OFFSET_KEY,
            value: minutes.to_string(),
            reason: "offset must be strictly within one day of UTC".to_owned(),
        };
        if !(1 - MINUTES_PER_DAY..MINUTES_PER_DAY).contains(&minutes) {
            return Err(invalid());
        }
        let utc_offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(invalid)?;
        Ok(Self { utc_offset })
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
        }
    }
}

/// Notification dispatcher sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Number of concurrent delivery workers.
    pub workers: usize,
    /// Maximum number of notifications waiting for a worker.
    pub capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_NOTIFY_WORKERS,
            capacity: DEFAULT_NOTIFY_CAPACITY,
        }
    }
}

impl FlowdayConfig {
    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let invitations = lookup(INVITATION_BASE_URL_KEY)
            .map(|raw| raw.trim().to_owned())
            .filter(|url| !url.is_empty())
            .map_or_else(InvitationConfig::default, |base_url| InvitationConfig {
                base_url,
            });

        let calendar = match lookup(UTC_OFFSET_KEY) {
            Some(raw) => {
                let minutes = parse_value::<i32>(UTC_OFFSET_KEY, &raw)?;
                CalendarConfig::from_offset_minutes(minutes)?
            }
            None => CalendarConfig::default(),
        };

        let workers = lookup(NOTIFY_WORKERS_KEY)
            .map(|raw| parse_positive(NOTIFY_WORKERS_KEY, &raw))
            .transpose()?
            .unwrap_or(DEFAULT_NOTIFY_WORKERS);
        let capacity = lookup(NOTIFY_CAPACITY_KEY)
            .map(|raw| parse_positive(NOTIFY_CAPACITY_KEY, &raw))
            .transpose()?
            .unwrap_or(DEFAULT_NOTIFY_CAPACITY);

        Ok(Self {
            invitations,
            calendar,
            dispatch: DispatchConfig { workers, capacity },
        })
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
            reason: err.to_string(),
        })
}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    let value = parse_value::<usize>(key, raw)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
            reason: "value must be at least 1".to_owned(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{CalendarConfig, ConfigError, FlowdayConfig, InvitationConfig};
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = FlowdayConfig::from_lookup(|_| None).expect("defaults should load");
        assert_eq!(config, FlowdayConfig::default());
        assert_eq!(config.dispatch.workers, 2);
        assert_eq!(config.dispatch.capacity, 128);
    }

    #[test]
    fn variables_override_defaults() {
        let config = FlowdayConfig::from_lookup(lookup_from(&[
            ("FLOWDAY_INVITATION_BASE_URL", "https://flowday.example/invite"),
            ("FLOWDAY_UTC_OFFSET_MINUTES", "-300"),
            ("FLOWDAY_NOTIFY_WORKERS", "4"),
            ("FLOWDAY_NOTIFY_QUEUE_CAPACITY", "16"),
        ]))
        .expect("overrides should load");

        assert_eq!(config.invitations.base_url, "https://flowday.example/invite");
        assert_eq!(config.calendar.utc_offset.local_minus_utc(), -300 * 60);
        assert_eq!(config.dispatch.workers, 4);
        assert_eq!(config.dispatch.capacity, 16);
    }

    #[rstest]
    #[case("FLOWDAY_NOTIFY_WORKERS", "0")]
    #[case("FLOWDAY_NOTIFY_QUEUE_CAPACITY", "many")]
    #[case("FLOWDAY_UTC_OFFSET_MINUTES", "1440")]
    #[case("FLOWDAY_UTC_OFFSET_MINUTES", "-1440")]
    #[case("FLOWDAY_UTC_OFFSET_MINUTES", "-2147483648")]
    #[case("FLOWDAY_UTC_OFFSET_MINUTES", "east")]
    fn malformed_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        let result = FlowdayConfig::from_lookup(lookup_from(&[(key, value)]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn acceptance_link_appends_token_query() {
        let config = InvitationConfig {
            base_url: "https://flowday.example/invitations".to_owned(),
        };
        assert_eq!(
            config.acceptance_link("abc123"),
            "https://flowday.example/invitations?token=abc123"
        );
    }

    #[test]
    fn acceptance_link_extends_existing_query() {
        let config = InvitationConfig {
            base_url: "https://flowday.example/app?view=invites".to_owned(),
        };
        assert_eq!(
            config.acceptance_link("abc123"),
            "https://flowday.example/app?view=invites&token=abc123"
        );
    }

    #[rstest]
    #[case(i32::MIN)]
    #[case(i32::MAX)]
    #[case(-1440)]
    #[case(1440)]
    fn offsets_of_a_day_or_more_are_rejected(#[case] minutes: i32) {
        assert!(matches!(
            CalendarConfig::from_offset_minutes(minutes),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[rstest]
    #[case(-1439)]
    #[case(1439)]
    fn offsets_just_inside_a_day_are_accepted(#[case] minutes: i32) {
        let calendar = CalendarConfig::from_offset_minutes(minutes).expect("valid offset");
        assert_eq!(calendar.utc_offset.local_minus_utc(), minutes * 60);
    }

    #[test]
    fn offset_constructor_accepts_half_hour_zones() {
        let calendar = CalendarConfig::from_offset_minutes(330).expect("valid offset");
        assert_eq!(calendar.utc_offset.local_minus_utc(), 330 * 60);
    }
}
