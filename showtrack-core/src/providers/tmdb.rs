use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use showtrack_model::{
    Episode, Season, SeasonSummary, ShowDetails, ShowId, ShowSummary,
};

use super::error::ProviderError;
use super::traits::{CatalogSource, DiscoverQuery, SourcePage, SourceQuery};

pub const TMDB_V3_BASE: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Connection settings for the TMDB v3 API.
#[derive(Clone)]
pub struct TmdbSettings {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub poster_size: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for TmdbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .field("poster_size", &self.poster_size)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl TmdbSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TMDB_V3_BASE.to_string(),
            image_base_url: TMDB_IMAGE_BASE.to_string(),
            poster_size: "w342".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(ProviderError::from)
    }
}

/// Catalog source backed by the TMDB v3 REST API.
pub struct TmdbCatalogSource {
    http: reqwest::Client,
    settings: TmdbSettings,
}

impl fmt::Debug for TmdbCatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbCatalogSource")
            .field("settings", &self.settings)
            .finish()
    }
}

impl TmdbCatalogSource {
    pub fn new(settings: TmdbSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            http: settings.http_client()?,
            settings,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    async fn get_tmdb_json<T>(
        &self,
        path: &str,
        mut params: Vec<(&'static str, String)>,
        language: Option<&str>,
    ) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        params.push(("api_key", self.settings.api_key.clone()));
        if let Some(language) = language {
            params.push(("language", language.to_string()));
        }

        let url = self.endpoint(path);
        debug!(%url, "TMDB request");
        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = check_status(response).await?;
        let body = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice::<T>(&body).map_err(|err| {
            error!(%url, "failed to decode TMDB payload: {err}");
            ProviderError::Parse(err.to_string())
        })
    }
}

#[async_trait]
impl CatalogSource for TmdbCatalogSource {
    async fn fetch_page(
        &self,
        query: &SourceQuery,
        page: u32,
        language: Option<&str>,
    ) -> Result<SourcePage, ProviderError> {
        let page = page.max(1);
        let (path, mut params) = match query {
            SourceQuery::Popular => ("/tv/popular", Vec::new()),
            SourceQuery::Discover(discover) => {
                ("/discover/tv", discover_params(discover))
            }
            SourceQuery::Search(text) => {
                ("/search/tv", vec![("query", text.clone())])
            }
        };
        params.push(("page", page.to_string()));

        let wire: TvPage = self.get_tmdb_json(path, params, language).await?;
        Ok(wire.into())
    }

    async fn show_details(
        &self,
        id: ShowId,
        language: Option<&str>,
    ) -> Result<ShowDetails, ProviderError> {
        let wire: TvDetails = self
            .get_tmdb_json(&format!("/tv/{id}"), Vec::new(), language)
            .await?;
        Ok(wire.into())
    }

    async fn season(
        &self,
        show_id: ShowId,
        season_number: u32,
        language: Option<&str>,
    ) -> Result<Season, ProviderError> {
        let wire: TvSeason = self
            .get_tmdb_json(
                &format!("/tv/{show_id}/season/{season_number}"),
                Vec::new(),
                language,
            )
            .await?;
        Ok(wire.into_season(show_id))
    }
}

/// Query parameters for `/discover/tv`.
pub fn discover_params(query: &DiscoverQuery) -> Vec<(&'static str, String)> {
    let filter = &query.filter;
    let mut params = vec![
        ("sort_by", filter.sort_key.api_name().to_string()),
        ("include_adult", "false".to_string()),
    ];
    if let Some(genres) = filter.genres_param() {
        params.push(("with_genres", genres));
    }
    if let Some(language) = filter.original_language.as_deref() {
        params.push(("with_original_language", language.to_string()));
    }
    if let Some(min) = filter.min_year {
        params.push(("first_air_date.gte", format!("{min:04}-01-01")));
    }
    if let Some(max) = filter.max_year {
        params.push(("first_air_date.lte", format!("{max:04}-12-31")));
    }
    if let Some(date) = query.min_air_date {
        params.push(("air_date.gte", date.format("%Y-%m-%d").to_string()));
    }
    params
}

pub(crate) fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(err)
    }
}

/// Pass successful responses through and map TMDB failure statuses.
pub(crate) async fn check_status(
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Debug, Deserialize)]
    struct TmdbErrorBody {
        #[serde(default)]
        status_message: Option<String>,
    }

    let message = response
        .json::<TmdbErrorBody>()
        .await
        .ok()
        .and_then(|body| body.status_message)
        .unwrap_or_else(|| format!("TMDB request failed with status {status}"));

    Err(match status {
        StatusCode::UNAUTHORIZED => ProviderError::InvalidApiKey,
        StatusCode::NOT_FOUND => ProviderError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        _ => ProviderError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, Deserialize)]
struct TvPage {
    #[serde(default)]
    results: Vec<TvItem>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct TvItem {
    id: ShowId,
    #[serde(default, deserialize_with = "non_empty")]
    name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f32>,
    #[serde(default, deserialize_with = "non_empty")]
    first_air_date: Option<String>,
}

impl From<TvPage> for SourcePage {
    fn from(page: TvPage) -> Self {
        SourcePage {
            items: page
                .results
                .into_iter()
                .map(|item| ShowSummary {
                    id: item.id,
                    poster_path: item.poster_path,
                    name: item.name,
                    vote: item.vote_average,
                    air_date: item.first_air_date,
                })
                .collect(),
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TvDetails {
    id: ShowId,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "non_empty")]
    poster_path: Option<String>,
    #[serde(default)]
    seasons: Vec<TvSeasonSummary>,
    #[serde(default, deserialize_with = "non_empty")]
    last_air_date: Option<String>,
    #[serde(default)]
    in_production: bool,
    #[serde(default, deserialize_with = "non_empty")]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvSeasonSummary {
    season_number: u32,
    #[serde(default, deserialize_with = "non_empty")]
    name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    air_date: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    poster_path: Option<String>,
}

impl From<TvDetails> for ShowDetails {
    fn from(details: TvDetails) -> Self {
        ShowDetails {
            id: details.id,
            name: details.name,
            poster_path: details.poster_path,
            seasons: details
                .seasons
                .into_iter()
                .map(|season| SeasonSummary {
                    season_number: season.season_number,
                    name: season.name,
                    air_date: season.air_date,
                    poster_path: season.poster_path,
                })
                .collect(),
            last_air_date: details.last_air_date,
            in_production: details.in_production,
            status: details.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TvSeason {
    season_number: u32,
    #[serde(default, deserialize_with = "non_empty")]
    name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    air_date: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    poster_path: Option<String>,
    #[serde(default)]
    episodes: Vec<TvEpisode>,
}

#[derive(Debug, Deserialize)]
struct TvEpisode {
    episode_number: u32,
    #[serde(default, deserialize_with = "non_empty")]
    name: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    air_date: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    overview: Option<String>,
}

impl TvSeason {
    fn into_season(self, show_id: ShowId) -> Season {
        Season {
            show_id,
            season_number: self.season_number,
            name: self.name,
            air_date: self.air_date,
            poster_path: self.poster_path,
            episodes: self
                .episodes
                .into_iter()
                .map(|episode| Episode {
                    episode_number: episode.episode_number,
                    name: episode.name,
                    air_date: episode.air_date,
                    overview: episode.overview,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use showtrack_model::{FilterSpec, SortKey};

    fn value_of<'a>(
        params: &'a [(&'static str, String)],
        key: &str,
    ) -> Option<&'a str> {
        params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn discover_params_cover_every_filter_field() {
        let filter = FilterSpec::new(SortKey::Votes)
            .with_genre(35)
            .with_genre(18)
            .with_original_language("ko")
            .with_years(Some(2015), Some(2020));
        let params = discover_params(&DiscoverQuery::filtered(filter));

        assert_eq!(value_of(&params, "sort_by"), Some("vote_average.desc"));
        assert_eq!(value_of(&params, "with_genres"), Some("18,35"));
        assert_eq!(value_of(&params, "with_original_language"), Some("ko"));
        assert_eq!(value_of(&params, "first_air_date.gte"), Some("2015-01-01"));
        assert_eq!(value_of(&params, "first_air_date.lte"), Some("2020-12-31"));
        assert_eq!(value_of(&params, "air_date.gte"), None);
    }

    #[test]
    fn upcoming_discover_sets_air_date_floor() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let params = discover_params(&DiscoverQuery::upcoming(today));
        assert_eq!(value_of(&params, "sort_by"), Some("popularity.desc"));
        assert_eq!(value_of(&params, "air_date.gte"), Some("2024-02-29"));
        assert_eq!(value_of(&params, "with_genres"), None);
    }

    #[test]
    fn empty_dates_decode_as_missing() {
        let page: TvPage = serde_json::from_str(
            r#"{"page":1,"total_pages":3,"results":[
                {"id":9,"name":"A","first_air_date":"","poster_path":null}
            ]}"#,
        )
        .unwrap();
        let page = SourcePage::from(page);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].air_date, None);
        assert_eq!(page.items[0].poster_path, None);
    }
}
