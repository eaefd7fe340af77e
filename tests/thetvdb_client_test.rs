//! TheTVDB client tests against a mock HTTP server.

mod common;

use std::sync::Arc;

use common::{sample_package_xml, zip_package};
use showforged::config::TheTvdbConfig;
use showforged::metadata::{
    DocumentParser, FieldKey, Media, RecordStore, ResolveEngine, ResolveOptions, ResolveOutcome,
    SeriesSource, SqliteRecordStore, ThetvdbClient, TvdbPackageParser,
};
use showforged_db::pool::init_memory_pool;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "TESTKEY";

const SEARCH_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<Data>
  <Series>
    <seriesid>42</seriesid>
    <language>en</language>
    <SeriesName>Sample Show</SeriesName>
    <id>42</id>
  </Series>
  <Series>
    <seriesid>77</seriesid>
    <language>en</language>
    <SeriesName>Sample Show (UK)</SeriesName>
    <id>77</id>
  </Series>
</Data>"#;

fn client_for(server: &MockServer) -> ThetvdbClient {
    ThetvdbClient::new(&TheTvdbConfig {
        api_key: API_KEY.into(),
        base_url: server.uri(),
        requests_per_second: 50,
        max_retries: 2,
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn search_returns_first_series_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/GetSeries.php"))
        .and(query_param("language", "all"))
        .and(query_param("seriesname", "Sample Show"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let id = client_for(&server).search_series("Sample Show").await.unwrap();
    assert_eq!(id.as_deref(), Some("42"));
}

#[tokio::test]
async fn search_without_results_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/GetSeries.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<Data></Data>"))
        .mount(&server)
        .await;

    let id = client_for(&server).search_series("Nothing").await.unwrap();
    assert!(id.is_none());
}

#[tokio::test]
async fn package_download_uses_key_and_language() {
    let server = MockServer::start().await;
    let archive = zip_package("de", &sample_package_xml());
    Mock::given(method("GET"))
        .and(path(format!("/api/{API_KEY}/series/42/all/de.zip")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = client_for(&server)
        .fetch_series_package("42", "de")
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), archive.as_slice());

    let package = TvdbPackageParser::new(&server.uri())
        .parse(&bytes, "de")
        .unwrap();
    assert_eq!(package.series.series_id, "42");
    assert_eq!(package.episodes.len(), 2);
    assert!(package
        .series
        .poster_url
        .as_deref()
        .unwrap()
        .starts_with(&server.uri()));
}

#[tokio::test]
async fn rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/GetSeries.php"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/GetSeries.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let id = client_for(&server).search_series("Sample Show").await.unwrap();
    assert_eq!(id.as_deref(), Some("42"));
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.search_series("Sample Show").await.is_err());
    assert!(client.fetch_series_package("42", "en").await.is_err());
}

#[tokio::test]
async fn engine_resolves_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/GetSeries.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/{API_KEY}/series/42/all/en.zip")))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(zip_package("en", &sample_package_xml())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(SqliteRecordStore::new(init_memory_pool().unwrap()));
    let engine = ResolveEngine::with_languages(
        store.clone(),
        Arc::new(client_for(&server)),
        Arc::new(TvdbPackageParser::new(&server.uri())),
        vec!["en".into()],
    );

    let keys = [FieldKey::EpisodeTitle, FieldKey::Poster, FieldKey::Performer];
    let mut media = Media::show("Sample Show").with_season_episode(1, 2);
    let outcome = engine
        .resolve(&mut media, &keys, &ResolveOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, ResolveOutcome::Fetched);
    assert_eq!(media.episode_title.as_deref(), Some("Second"));
    assert_eq!(media.performers, vec!["Jane Doe", "John Roe"]);
    assert_eq!(
        media.poster,
        Some(format!("{}/banners/posters/42-1.jpg", server.uri()))
    );
    assert!(store.find_fuzzy_name("Sample Show").await.unwrap().is_some());

    // Served from the cache; the mocks' expectations would fail on a second hit.
    let mut again = Media::show("Sample Show").with_season_episode(1, 2);
    let outcome = engine
        .resolve(&mut again, &keys, &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome, ResolveOutcome::Cached);
    assert_eq!(again, media);
}

#[tokio::test]
async fn missing_api_key_disables_remote_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ThetvdbClient::new(&TheTvdbConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();
    assert!(!client.is_available());

    let engine = ResolveEngine::with_languages(
        Arc::new(SqliteRecordStore::new(init_memory_pool().unwrap())),
        Arc::new(client),
        Arc::new(TvdbPackageParser::default()),
        vec!["en".into()],
    );
    let mut media = Media::show("Sample Show");
    let outcome = engine
        .resolve(&mut media, &[FieldKey::Genre], &ResolveOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome, ResolveOutcome::FetchFailed);
}
