//! Core data model definitions shared across showtrack crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod catalog;
pub mod filter;
pub mod reminder;
pub mod show;
pub mod updates;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{CatalogPage, CatalogRepresentation, RepresentationKind};
pub use filter::{FilterSpec, SortKey};
pub use reminder::{
    ReminderId, ReminderIdParseError, SeasonKey, SeasonReminderStatus,
};
pub use show::{
    Episode, Season, SeasonSummary, ShowDetails, ShowId, ShowSummary,
};
pub use updates::{Artwork, FeedEntry, UpdatesFeed};
