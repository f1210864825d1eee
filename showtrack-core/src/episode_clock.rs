//! Pure air-date arithmetic.
//!
//! Air dates are calendar dates; a date counts as the instant 00:00 UTC of
//! that day. Every comparison against a reference instant is strict, so the
//! boundary instant itself is never "after" and re-running a window with the
//! same timestamp yields the same set.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use showtrack_model::{Episode, Season};

/// Parse a `YYYY-MM-DD` date, tolerating a full RFC 3339 timestamp.
pub fn parse_air_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

pub fn date_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// The instant a raw air date refers to, if it parses.
pub fn air_instant(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_air_date).map(date_instant)
}

pub fn episode_air_instant(episode: &Episode) -> Option<DateTime<Utc>> {
    air_instant(episode.air_date.as_deref())
}

/// `true` when `raw` parses and lies strictly after `instant`.
pub fn aired_after(raw: Option<&str>, instant: DateTime<Utc>) -> bool {
    air_instant(raw).is_some_and(|at| at > instant)
}

/// Episodes with a missing or unparseable date are never future.
pub fn is_future(episode: &Episode, now: DateTime<Utc>) -> bool {
    aired_after(episode.air_date.as_deref(), now)
}

pub fn episodes_after(season: &Season, instant: DateTime<Utc>) -> Vec<&Episode> {
    season
        .episodes
        .iter()
        .filter(|episode| aired_after(episode.air_date.as_deref(), instant))
        .collect()
}

pub fn future_episodes(season: &Season, now: DateTime<Utc>) -> Vec<&Episode> {
    episodes_after(season, now)
}

pub fn past_episodes(season: &Season, now: DateTime<Utc>) -> Vec<&Episode> {
    season
        .episodes
        .iter()
        .filter(|episode| episode_air_instant(episode).is_some_and(|at| at <= now))
        .collect()
}

pub fn has_future_episodes(season: &Season, now: DateTime<Utc>) -> bool {
    season.episodes.iter().any(|episode| is_future(episode, now))
}
