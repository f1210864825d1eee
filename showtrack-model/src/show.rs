#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Remote (TMDB) identifier of a show.
pub type ShowId = u64;

/// Lightweight catalog entry returned by every paged listing.
///
/// Identity is `id`; two fetches of the same id may disagree on poster or
/// vote, in which case the most recent one is authoritative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShowSummary {
    pub id: ShowId,
    pub poster_path: Option<String>,
    pub name: Option<String>,
    pub vote: Option<f32>,
    /// First air date as a `YYYY-MM-DD` calendar date string.
    pub air_date: Option<String>,
}

impl ShowSummary {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeasonSummary {
    pub season_number: u32,
    pub name: Option<String>,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShowDetails {
    pub id: ShowId,
    pub name: String,
    pub poster_path: Option<String>,
    pub seasons: Vec<SeasonSummary>,
    pub last_air_date: Option<String>,
    pub in_production: bool,
    pub status: Option<String>,
}

impl ShowDetails {
    /// The season with the highest number.
    ///
    /// Specials (season 0) only win when the show has nothing else.
    pub fn latest_season(&self) -> Option<&SeasonSummary> {
        self.seasons
            .iter()
            .filter(|season| season.season_number >= 1)
            .max_by_key(|season| season.season_number)
            .or_else(|| self.seasons.iter().max_by_key(|s| s.season_number))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Episode {
    pub episode_number: u32,
    pub name: Option<String>,
    pub air_date: Option<String>,
    pub overview: Option<String>,
}

impl Episode {
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Episode {}", self.episode_number),
        }
    }
}

/// A fully fetched season: summary fields plus its episode list.
///
/// Every episode belongs to exactly one `(show_id, season_number)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Season {
    pub show_id: ShowId,
    pub season_number: u32,
    pub name: Option<String>,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
    pub episodes: Vec<Episode>,
}

impl Season {
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Season {}", self.season_number),
        }
    }
}
