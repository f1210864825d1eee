use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::filter::FilterSpec;
use crate::show::ShowSummary;

/// Addresses one independently paged view regardless of its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RepresentationKind {
    Popular,
    Filtered,
    Upcoming,
    Search,
}

impl RepresentationKind {
    pub fn all() -> &'static [RepresentationKind] {
        &[
            RepresentationKind::Popular,
            RepresentationKind::Filtered,
            RepresentationKind::Upcoming,
            RepresentationKind::Search,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepresentationKind::Popular => "popular",
            RepresentationKind::Filtered => "filtered",
            RepresentationKind::Upcoming => "upcoming",
            RepresentationKind::Search => "search",
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A representation together with its query identity.
///
/// Two values are "the same representation" exactly when they compare equal,
/// which is what decides cache reuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum CatalogRepresentation {
    Popular,
    Filtered { filter: FilterSpec },
    Upcoming,
    Search { query: String },
}

impl CatalogRepresentation {
    pub fn filtered(filter: FilterSpec) -> Self {
        CatalogRepresentation::Filtered { filter }
    }

    pub fn search(query: impl Into<String>) -> Self {
        CatalogRepresentation::Search {
            query: query.into(),
        }
    }

    pub fn kind(&self) -> RepresentationKind {
        match self {
            CatalogRepresentation::Popular => RepresentationKind::Popular,
            CatalogRepresentation::Filtered { .. } => {
                RepresentationKind::Filtered
            }
            CatalogRepresentation::Upcoming => RepresentationKind::Upcoming,
            CatalogRepresentation::Search { .. } => RepresentationKind::Search,
        }
    }
}

/// One page handed back to callers of the pager.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogPage {
    pub representation: CatalogRepresentation,
    pub page: u32,
    pub total_pages: u32,
    pub items: Vec<ShowSummary>,
}
