use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SortKey {
    #[default]
    Popularity,
    AirDateDesc,
    Votes,
}

impl SortKey {
    pub fn all() -> &'static [SortKey] {
        &[SortKey::Popularity, SortKey::AirDateDesc, SortKey::Votes]
    }

    /// TMDB `sort_by` value for discover queries.
    pub fn api_name(&self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity.desc",
            SortKey::AirDateDesc => "first_air_date.desc",
            SortKey::Votes => "vote_average.desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Popularity => "popularity",
            SortKey::AirDateDesc => "air-date",
            SortKey::Votes => "votes",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Discover filter. Equality decides whether two requests address the same
/// filtered representation, so genres live in an ordered set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterSpec {
    pub sort_key: SortKey,
    pub genre_ids: BTreeSet<u32>,
    pub original_language: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl FilterSpec {
    pub fn new(sort_key: SortKey) -> Self {
        Self {
            sort_key,
            ..Self::default()
        }
    }

    pub fn with_genre(mut self, genre_id: u32) -> Self {
        self.genre_ids.insert(genre_id);
        self
    }

    pub fn with_original_language(mut self, code: impl Into<String>) -> Self {
        self.original_language = Some(code.into());
        self
    }

    pub fn with_years(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_year = min;
        self.max_year = max;
        self
    }

    /// Comma-joined genre list in ascending order, `None` when empty.
    pub fn genres_param(&self) -> Option<String> {
        if self.genre_ids.is_empty() {
            return None;
        }
        Some(
            self.genre_ids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_insertion_order_does_not_affect_identity() {
        let a = FilterSpec::new(SortKey::Votes).with_genre(18).with_genre(35);
        let b = FilterSpec::new(SortKey::Votes).with_genre(35).with_genre(18);
        assert_eq!(a, b);
        assert_eq!(a.genres_param().as_deref(), Some("18,35"));
    }

    #[test]
    fn empty_genres_produce_no_param() {
        assert!(FilterSpec::default().genres_param().is_none());
    }
}
