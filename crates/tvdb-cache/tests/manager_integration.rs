//! End-to-end tests of the manager against a mocked TheTVDB server.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tvdb_cache::{GateConfig, TvdbClientManager};
use tvdb_client::{EpisodeQuery, ImagesQuery, TvdbClient};
use tvdb_config::TvdbConfig;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn series_body(id: u32, name: &str) -> serde_json::Value {
    serde_json::json!({"data": {"id": id, "seriesName": name}})
}

async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(serde_json::json!({"apikey": "test-key"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": token})))
        .expect(times)
        .mount(server)
        .await;
}

fn manager(server: &MockServer, config: GateConfig) -> TvdbClientManager {
    let client = TvdbClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap();
    TvdbClientManager::new(client, "test-key", config)
}

#[tokio::test]
async fn test_repeated_lookup_hits_cache() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/series/42"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body(42, "X")))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();

    let first = manager.series(42, &cancel).await.unwrap();
    let second = manager.series(42, &cancel).await.unwrap();

    assert_eq!(first.data, second.data);
    assert_eq!(second.data.series_name.as_deref(), Some("X"));
    let stats = manager.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
}

#[tokio::test]
async fn test_concurrent_lookups_share_one_call() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/series/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(series_body(42, "X"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = Arc::new(manager(&server, GateConfig::new()));
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                manager
                    .series(42, &CancellationToken::new())
                    .await
                    .map(|r| r.data.id)
            })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap(), 42);
    }
}

#[tokio::test]
async fn test_failed_lookup_is_not_cached() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/series/42"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(serde_json::json!({"Error": "maintenance"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body(42, "X")))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();

    let err = manager.series(42, &cancel).await.unwrap_err();
    assert!(err.is_server_error());
    assert!(manager.gate().is_empty());

    let series = manager.series(42, &cancel).await.unwrap();
    assert_eq!(series.data.id, 42);
}

#[tokio::test]
async fn test_not_found_propagates() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/episodes/7"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"Error": "ID: 7 not found"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let err = manager.episode(7, &cancel).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

#[tokio::test]
async fn test_rejected_key_is_retried_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"Error": "API Key Required"})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let err = manager.languages(&cancel).await.unwrap_err();
        assert!(err.is_auth_error());
        assert!(!manager.guardian().has_session().await);
    }
}

#[tokio::test]
async fn test_stale_token_is_refreshed() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/refresh_token"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "token-2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/1"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body(1, "A")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/2"))
        .and(header("authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body(2, "B")))
        .expect(1)
        .mount(&server)
        .await;

    // A zero threshold makes the session stale on every later acquisition.
    let config = GateConfig::new().with_refresh_threshold(Duration::ZERO);
    let manager = manager(&server, config);
    let cancel = CancellationToken::new();

    manager.series(1, &cancel).await.unwrap();
    manager.series(2, &cancel).await.unwrap();
}

#[tokio::test]
async fn test_rejected_refresh_falls_back_to_login() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 2).await;
    Mock::given(method("GET"))
        .and(path("/refresh_token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"Error": "token expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body(42, "X")))
        .expect(2)
        .mount(&server)
        .await;

    let config = GateConfig::new()
        .with_ttl(Duration::ZERO)
        .with_refresh_threshold(Duration::ZERO);
    let manager = manager(&server, config);
    let cancel = CancellationToken::new();

    manager.series(42, &cancel).await.unwrap();
    manager.series(42, &cancel).await.unwrap();
    assert!(manager.guardian().has_session().await);
}

#[tokio::test]
async fn test_language_is_sent() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/languages"))
        .and(header("accept-language", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 14, "abbreviation": "de", "name": "Deutsch", "englishName": "German"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, GateConfig::new().with_language("de"));
    let languages = manager.languages(&CancellationToken::new()).await.unwrap();

    assert_eq!(languages.data.len(), 1);
    assert_eq!(languages.data[0].english_name, "German");
}

#[tokio::test]
async fn test_filters_are_cached_separately() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    for key_type in ["poster", "fanart"] {
        Mock::given(method("GET"))
            .and(path("/series/42/images/query"))
            .and(query_param("keyType", key_type))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 1, "keyType": key_type}]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();

    let poster = ImagesQuery::key_type("poster");
    let fanart = ImagesQuery::key_type("fanart");
    let a = manager.images(42, &poster, &cancel).await.unwrap();
    let b = manager.images(42, &fanart, &cancel).await.unwrap();
    manager.images(42, &poster, &cancel).await.unwrap();

    assert_eq!(a.data[0].key_type.as_deref(), Some("poster"));
    assert_eq!(b.data[0].key_type.as_deref(), Some("fanart"));
    assert_eq!(manager.gate().len(), 2);
}

#[tokio::test]
async fn test_episode_pages_are_cached_separately() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    for page in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path("/series/42/episodes/query"))
            .and(query_param("page", page))
            .and(query_param("airedSeason", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 100, "airedSeason": 1}],
                "links": {"first": 1, "last": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();
    let season = EpisodeQuery::aired_season(1);

    let first = manager.episodes_page(42, 1, &season, &cancel).await.unwrap();
    manager.episodes_page(42, 2, &season, &cancel).await.unwrap();
    manager.episodes_page(42, 1, &season, &cancel).await.unwrap();

    assert_eq!(first.links.and_then(|l| l.last), Some(2));
    assert_eq!(manager.stats().misses, 2);
}

#[tokio::test]
async fn test_search_operations_do_not_share_entries() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    for param in ["name", "imdbId", "zap2itId"] {
        Mock::given(method("GET"))
            .and(path("/search/series"))
            .and(query_param(param, "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 42, "seriesName": param}]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();

    let by_name = manager.series_by_name("42", &cancel).await.unwrap();
    let by_imdb = manager.series_by_imdb_id("42", &cancel).await.unwrap();
    let by_zap2it = manager.series_by_zap2it_id("42", &cancel).await.unwrap();

    assert_eq!(by_name.data[0].series_name.as_deref(), Some("name"));
    assert_eq!(by_imdb.data[0].series_name.as_deref(), Some("imdbId"));
    assert_eq!(by_zap2it.data[0].series_name.as_deref(), Some("zap2itId"));
}

#[tokio::test]
async fn test_series_details_lookups() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/series/42/actors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 9, "name": "Nathan Fillion", "role": "Mal"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/42/episodes/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"airedSeasons": ["1", "0"], "airedEpisodes": "14"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let actors = manager.actors(42, &cancel).await.unwrap();
        assert_eq!(actors.data[0].role.as_deref(), Some("Mal"));

        let summary = manager.episode_summary(42, &cancel).await.unwrap();
        assert_eq!(summary.data.aired_episodes.as_deref(), Some("14"));
    }
}

#[tokio::test]
async fn test_cancelled_lookup_leaves_no_entry() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1", 1).await;
    Mock::given(method("GET"))
        .and(path("/series/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(series_body(42, "X"))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series/43"))
        .respond_with(ResponseTemplate::new(200).set_body_json(series_body(43, "Y")))
        .mount(&server)
        .await;

    let manager = manager(&server, GateConfig::new());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = manager.series(42, &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(!manager.gate().contains("series/42"));

    let other = tokio::time::timeout(
        Duration::from_secs(5),
        manager.series(43, &CancellationToken::new()),
    )
    .await
    .expect("miss lock still held after cancellation")
    .unwrap();
    assert_eq!(other.data.id, 43);
}

#[tokio::test]
async fn test_from_config() {
    let server = MockServer::start().await;
    // The key may come from TVDB_API_KEY, so the body is not matched.
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "t"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/languages"))
        .and(header("accept-language", "fr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TvdbConfig::from_toml(&format!(
        "[api]\nbase_url = \"{}\"\napi_key = \"test-key\"\nlanguage = \"fr\"\n\n[cache]\nttl_secs = 120\n",
        server.uri()
    ))
    .unwrap();

    let manager = TvdbClientManager::from_config(&config).unwrap();
    assert_eq!(manager.config().ttl, Duration::from_secs(120));

    let languages = manager.languages(&CancellationToken::new()).await.unwrap();
    assert!(languages.data.is_empty());
}
