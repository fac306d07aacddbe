// End-to-end news service tests against a mock upstream
// Author: kelexine (https://github.com/kelexine)

use headline_cache::config::{NewsConfig, UpstreamConfig};
use headline_cache::news::NewsService;
use headline_cache::upstream::GNewsClient;
use mockito::Matcher;
use std::sync::Arc;

fn news_config() -> NewsConfig {
    NewsConfig {
        cache_ttl_seconds: 7200,
        fallback_ttl_seconds: 300,
        revalidate_window_seconds: 900,
        min_request_interval_ms: 10,
        task_timeout_seconds: 5,
        max_cache_entries: 16,
        fallback_batch_size: 10,
        throttle_cooldown_seconds: 60,
        max_cooldown_seconds: 900,
    }
}

fn service(base_url: String) -> NewsService {
    let upstream = UpstreamConfig {
        base_url,
        api_key: Some("k".to_string()),
        ..Default::default()
    };
    let client = GNewsClient::new(&upstream).unwrap();
    NewsService::new(&news_config(), Arc::new(client))
}

#[tokio::test]
async fn test_upstream_feed_is_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/top-headlines")
        .match_query(Matcher::UrlEncoded("category".into(), "sports".into()))
        .with_status(200)
        .with_body(
            r#"{"articles": [
                {"title": "Final no Maracanã", "description": "Casa cheia", "url": "https://e.com/1", "source": {"name": "GE"}},
                {"title": "Técnico demitido", "url": "https://e.com/2", "source": {"name": "Lance"}}
            ]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let news = service(server.url());
    let first = news.top_headlines("esportes").await;
    let second = news.top_headlines("Esportes").await;

    mock.assert_async().await;
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].title, "Final no Maracanã");
    assert_eq!(first[0].category, "ESPORTES");
    assert!(!first[0].is_synthetic());
    assert_eq!(first, second);
    assert_eq!(news.cache_stats().stats.hits, 1);
}

#[tokio::test]
async fn test_rate_limit_is_masked_and_pauses_upstream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(1)
        .create_async()
        .await;

    let news = service(server.url());
    let world = news.international_news().await;
    let search = news.search_news("inflação", None).await;

    mock.assert_async().await;
    assert!(!world.is_empty() && world.iter().all(|i| i.is_synthetic()));
    assert!(search[0].title.contains("inflação"));
    assert!(news.cooldown_remaining().is_some());
}
