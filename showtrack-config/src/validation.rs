use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};
use thiserror::Error;

use super::models::Config;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("{field} must be a duration such as `10m` or `7days`, got '{value}'")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("{field} is out of range: '{value}'")]
    DurationOutOfRange { field: &'static str, value: String },
    #[error("reminders.fire_time must be HH:MM, got '{value}'")]
    InvalidFireTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("{field} must be a positive integer, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("reconcile.max_concurrent_fetches must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.reconcile.max_concurrent_fetches == 0 {
        return Err(ConfigGuardRailError::ZeroConcurrency);
    }

    if config.tmdb.api_key.is_none() {
        warnings.push_with_hint(
            "TMDB_API_KEY not configured; catalog browsing and update checks are unavailable",
            "Set TMDB_API_KEY or add `api_key` under [tmdb] in showtrack.toml",
        );
    }

    if config.reminders.repair_lookback.is_zero() {
        warnings.push(
            "reminders.repair_lookback is zero; missed reminders are only repaired since the last check",
        );
    }

    Ok(warnings)
}

pub fn parse_duration(
    field: &'static str,
    raw: &str,
) -> Result<Duration, ConfigGuardRailError> {
    humantime::parse_duration(raw.trim()).map_err(|source| {
        ConfigGuardRailError::InvalidDuration {
            field,
            value: raw.to_string(),
            source,
        }
    })
}

pub fn parse_time_delta(
    field: &'static str,
    raw: &str,
) -> Result<TimeDelta, ConfigGuardRailError> {
    let duration = parse_duration(field, raw)?;
    TimeDelta::from_std(duration).map_err(|_| {
        ConfigGuardRailError::DurationOutOfRange {
            field,
            value: raw.to_string(),
        }
    })
}

pub fn parse_fire_time(raw: &str) -> Result<NaiveTime, ConfigGuardRailError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|source| {
        ConfigGuardRailError::InvalidFireTime {
            value: raw.to_string(),
            source,
        }
    })
}

pub fn parse_count(
    field: &'static str,
    raw: &str,
) -> Result<usize, ConfigGuardRailError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigGuardRailError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humantime_durations_parse() {
        assert_eq!(
            parse_time_delta("repair_lookback", "7days").unwrap(),
            TimeDelta::days(7)
        );
        assert_eq!(
            parse_duration("request_timeout", " 15s ").unwrap(),
            Duration::from_secs(15)
        );
        assert!(matches!(
            parse_duration("request_timeout", "soon"),
            Err(ConfigGuardRailError::InvalidDuration { field: "request_timeout", .. })
        ));
    }

    #[test]
    fn fire_time_requires_hours_and_minutes() {
        assert_eq!(
            parse_fire_time("18:30").unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        );
        assert!(parse_fire_time("25:00").is_err());
        assert!(parse_fire_time("9am").is_err());
    }

    #[test]
    fn counts_reject_signs_and_text() {
        assert_eq!(parse_count("max_concurrent_fetches", "4").unwrap(), 4);
        assert!(parse_count("max_concurrent_fetches", "-1").is_err());
        assert!(parse_count("max_concurrent_fetches", "many").is_err());
    }
}
