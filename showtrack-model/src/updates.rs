use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::show::ShowId;

/// Poster artwork attached to a feed entry. Image failures never fail a
/// reconciliation pass; they degrade to the placeholder.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum Artwork {
    Loaded { bytes: Vec<u8> },
    Placeholder,
}

impl Artwork {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Artwork::Placeholder)
    }
}

impl std::fmt::Debug for Artwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Artwork::Loaded { bytes } => f
                .debug_struct("Loaded")
                .field("byte_len", &bytes.len())
                .finish(),
            Artwork::Placeholder => f.write_str("Placeholder"),
        }
    }
}

/// One show with something new since the last check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeedEntry {
    pub show_id: ShowId,
    pub show_name: String,
    pub season_number: u32,
    /// Set only when the season itself premiered after the last check.
    pub new_season_name: Option<String>,
    pub new_episode_names: Vec<String>,
    pub poster: Artwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UpdatesFeed {
    /// Timestamp the feed was computed against (`None` on first run).
    pub since: Option<DateTime<Utc>>,
    pub entries: Vec<FeedEntry>,
}

impl UpdatesFeed {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
