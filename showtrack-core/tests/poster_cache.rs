//! Poster downloads through the on-disk blob cache.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use showtrack_core::infra::cache::{
    PosterBlobStore, PosterCacheRoot, poster_cache_key_for,
};
use showtrack_core::providers::{
    HttpPosterLoader, PosterLoader, ProviderError, TmdbSettings,
};

fn settings(server: &MockServer) -> TmdbSettings {
    TmdbSettings::new("test-key").with_image_base_url(server.uri())
}

#[tokio::test]
async fn second_load_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w342/abc.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"poster".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = PosterBlobStore::new(PosterCacheRoot::new(dir.path().to_path_buf()));
    let loader = HttpPosterLoader::new(&settings(&server))
        .unwrap()
        .with_cache(store.clone());

    assert_eq!(loader.load("/abc.jpg").await.unwrap(), b"poster");
    assert_eq!(loader.load("/abc.jpg").await.unwrap(), b"poster");

    let cached = store
        .read(&poster_cache_key_for("w342", "/abc.jpg"))
        .await
        .unwrap();
    assert_eq!(cached.as_deref(), Some(&b"poster"[..]));
}

#[tokio::test]
async fn missing_poster_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w342/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = PosterBlobStore::new(PosterCacheRoot::new(dir.path().to_path_buf()));
    let loader = HttpPosterLoader::new(&settings(&server))
        .unwrap()
        .with_cache(store.clone());

    for _ in 0..2 {
        assert!(matches!(
            loader.load("/gone.jpg").await,
            Err(ProviderError::NotFound)
        ));
    }
    assert!(
        store
            .read(&poster_cache_key_for("w342", "/gone.jpg"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn loader_without_cache_downloads_every_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w342/x.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .expect(2)
        .mount(&server)
        .await;

    let loader = HttpPosterLoader::new(&settings(&server)).unwrap();
    loader.load("/x.png").await.unwrap();
    loader.load("x.png").await.unwrap();
}
