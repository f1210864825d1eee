use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::show::ShowId;

/// Season identity used for season-scoped reminder matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeasonKey {
    pub show_id: ShowId,
    pub season_number: u32,
}

impl SeasonKey {
    pub fn new(show_id: ShowId, season_number: u32) -> Self {
        Self {
            show_id,
            season_number,
        }
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.show_id, self.season_number)
    }
}

/// Durable identity of one episode reminder.
///
/// Serialized as `"{show_id}.{season_number}.{episode_number}"` (ASCII
/// decimal, no leading zeros). The string form is the only join key between
/// the reminder backend and the domain, so parsing is strict: every valid
/// string maps back to exactly one triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderId {
    pub show_id: ShowId,
    pub season_number: u32,
    pub episode_number: u32,
}

impl ReminderId {
    pub fn new(show_id: ShowId, season_number: u32, episode_number: u32) -> Self {
        Self {
            show_id,
            season_number,
            episode_number,
        }
    }

    pub fn season_key(&self) -> SeasonKey {
        SeasonKey::new(self.show_id, self.season_number)
    }

    pub fn belongs_to(&self, season: SeasonKey) -> bool {
        self.season_key() == season
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.show_id, self.season_number, self.episode_number
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReminderIdParseError {
    #[error("expected three dot-separated components in `{0}`")]
    WrongArity(String),
    #[error("component `{component}` of `{input}` is not a canonical decimal")]
    InvalidComponent { input: String, component: String },
}

fn parse_component<T: FromStr>(
    input: &str,
    component: &str,
) -> Result<T, ReminderIdParseError> {
    let canonical = !component.is_empty()
        && component.bytes().all(|b| b.is_ascii_digit())
        && !(component.len() > 1 && component.starts_with('0'));
    if !canonical {
        return Err(ReminderIdParseError::InvalidComponent {
            input: input.to_string(),
            component: component.to_string(),
        });
    }
    component
        .parse()
        .map_err(|_| ReminderIdParseError::InvalidComponent {
            input: input.to_string(),
            component: component.to_string(),
        })
}

impl FromStr for ReminderId {
    type Err = ReminderIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [show, season, episode] = parts.as_slice() else {
            return Err(ReminderIdParseError::WrongArity(s.to_string()));
        };
        Ok(Self {
            show_id: parse_component(s, show)?,
            season_number: parse_component(s, season)?,
            episode_number: parse_component(s, episode)?,
        })
    }
}

#[cfg(feature = "serde")]
impl Serialize for ReminderId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ReminderId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Reminder state of one season as shown next to its notification toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SeasonReminderStatus {
    /// At least one reminder for the season is pending.
    On,
    /// Future episodes exist but nothing is scheduled.
    Off,
    /// Every episode has already aired; there is nothing left to notify for.
    NotApplicable,
}
