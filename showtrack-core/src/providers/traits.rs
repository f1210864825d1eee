use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta};

use showtrack_model::{FilterSpec, Season, ShowDetails, ShowId, ShowSummary};

use super::error::ProviderError;

/// Query handed to a [`CatalogSource`]; every pager representation resolves
/// to one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceQuery {
    Popular,
    Discover(DiscoverQuery),
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DiscoverQuery {
    pub filter: FilterSpec,
    /// Lower bound on the air date of any episode (`air_date.gte`).
    pub min_air_date: Option<NaiveDate>,
}

impl DiscoverQuery {
    pub fn filtered(filter: FilterSpec) -> Self {
        Self {
            filter,
            min_air_date: None,
        }
    }

    /// Shows with an episode airing tomorrow or later, most popular first.
    pub fn upcoming(today: NaiveDate) -> Self {
        Self {
            filter: FilterSpec::default(),
            min_air_date: Some(
                today.checked_add_signed(TimeDelta::days(1)).unwrap_or(today),
            ),
        }
    }
}

/// One raw page from the catalog source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourcePage {
    pub items: Vec<ShowSummary>,
    pub total_pages: u32,
}

/// Read side of the remote catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &SourceQuery,
        page: u32,
        language: Option<&str>,
    ) -> Result<SourcePage, ProviderError>;

    async fn show_details(
        &self,
        id: ShowId,
        language: Option<&str>,
    ) -> Result<ShowDetails, ProviderError>;

    async fn season(
        &self,
        show_id: ShowId,
        season_number: u32,
        language: Option<&str>,
    ) -> Result<Season, ProviderError>;
}

/// Fetches poster bytes for a provider-relative path like `/abc.jpg`.
#[async_trait]
pub trait PosterLoader: Send + Sync {
    async fn load(&self, poster_path: &str) -> Result<Vec<u8>, ProviderError>;
}
