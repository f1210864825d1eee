use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};

use showtrack_core::{CoreContext, FixedClock};
use showtrack_model::{Episode, Season, SeasonSummary, ShowDetails, ShowId};

/// Reference day `D` used across scenarios.
pub fn day_zero() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

pub fn day(offset: i64) -> NaiveDate {
    day_zero() + TimeDelta::days(offset)
}

pub fn date_str(offset: i64) -> String {
    day(offset).format("%Y-%m-%d").to_string()
}

/// Noon UTC on `D + offset`.
pub fn noon(offset: i64) -> DateTime<Utc> {
    let date = day(offset);
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).expect("valid time"))
}

pub fn context_at(now: DateTime<Utc>) -> (CoreContext, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now));
    (
        CoreContext::new(Some("en-US".to_string()), clock.clone()),
        clock,
    )
}

pub fn episode(number: u32, air_offset: Option<i64>) -> Episode {
    Episode {
        episode_number: number,
        name: Some(format!("Chapter {number}")),
        air_date: air_offset.map(date_str),
        overview: None,
    }
}

pub fn season(
    show_id: ShowId,
    season_number: u32,
    air_offset: Option<i64>,
    episodes: Vec<Episode>,
) -> Season {
    Season {
        show_id,
        season_number,
        name: Some(format!("Season {season_number}")),
        air_date: air_offset.map(date_str),
        poster_path: None,
        episodes,
    }
}

pub fn details(
    id: ShowId,
    name: &str,
    last_air_offset: Option<i64>,
    season_numbers: &[u32],
) -> ShowDetails {
    ShowDetails {
        id,
        name: name.to_string(),
        poster_path: Some(format!("/poster-{id}.jpg")),
        seasons: season_numbers
            .iter()
            .map(|&season_number| SeasonSummary {
                season_number,
                name: Some(format!("Season {season_number}")),
                air_date: None,
                poster_path: None,
            })
            .collect(),
        last_air_date: last_air_offset.map(date_str),
        in_production: true,
        status: Some("Returning Series".to_string()),
    }
}
