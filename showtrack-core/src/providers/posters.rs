use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::infra::cache::{PosterBlobStore, poster_cache_key_for};

use super::error::ProviderError;
use super::tmdb::{TmdbSettings, check_status, map_transport_error};
use super::traits::PosterLoader;

/// Downloads posters from the TMDB image CDN, optionally through an on-disk
/// blob cache.
pub struct HttpPosterLoader {
    http: reqwest::Client,
    image_base_url: String,
    poster_size: String,
    cache: Option<PosterBlobStore>,
}

impl fmt::Debug for HttpPosterLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPosterLoader")
            .field("image_base_url", &self.image_base_url)
            .field("poster_size", &self.poster_size)
            .field("cache", &self.cache)
            .finish()
    }
}

impl HttpPosterLoader {
    pub fn new(settings: &TmdbSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            http: settings.http_client()?,
            image_base_url: settings.image_base_url.clone(),
            poster_size: settings.poster_size.clone(),
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: PosterBlobStore) -> Self {
        self.cache = Some(cache);
        self
    }

    fn url_for(&self, poster_path: &str) -> String {
        let base = self.image_base_url.trim_end_matches('/');
        let path = poster_path.trim_start_matches('/');
        format!("{base}/{}/{path}", self.poster_size)
    }

    async fn download(&self, poster_path: &str) -> Result<Vec<u8>, ProviderError> {
        let url = self.url_for(poster_path);
        debug!(%url, "downloading poster");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PosterLoader for HttpPosterLoader {
    async fn load(&self, poster_path: &str) -> Result<Vec<u8>, ProviderError> {
        let Some(cache) = &self.cache else {
            return self.download(poster_path).await;
        };

        let key = poster_cache_key_for(&self.poster_size, poster_path);
        match cache.read(&key).await {
            Ok(Some(bytes)) => return Ok(bytes),
            Ok(None) => {}
            Err(err) => {
                warn!(%key, "poster cache read failed, refetching: {err}");
                if let Err(err) = cache.remove(&key).await {
                    debug!(%key, "failed to evict poster entry: {err}");
                }
            }
        }

        let bytes = self.download(poster_path).await?;
        if let Err(err) = cache.write(&key, &bytes).await {
            warn!(%key, "failed to cache poster: {err}");
        }
        Ok(bytes)
    }
}
