// Configuration loading tests
// Author: kelexine (https://github.com/kelexine)

use headline_cache::config::AppConfig;
use std::io::Write;
use tempfile::NamedTempFile;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_file_overrides_defaults() {
    let file = toml_file(
        r#"
        [server]
        port = 9999

        [upstream]
        api_key = "secret"
        lang = "en"

        [news]
        cache_ttl_seconds = 600
        fallback_batch_size = 20
        "#,
    );

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.upstream.api_key.as_deref(), Some("secret"));
    assert_eq!(config.upstream.lang, "en");
    assert_eq!(config.upstream.country, "br");
    assert_eq!(config.news.cache_ttl_seconds, 600);
    assert_eq!(config.news.fallback_batch_size, 20);
    assert_eq!(config.news.min_request_interval_ms, 3000);
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(AppConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    let file = toml_file(
        r#"
        [news]
        fallback_batch_size = 3
        "#,
    );
    let err = AppConfig::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("fallback_batch_size"));
}

#[test]
fn test_environment_overrides_file() {
    let file = toml_file(
        r#"
        [markets]
        cache_ttl_seconds = 120
        "#,
    );
    std::env::set_var("HEADLINE_CACHE__MARKETS__CACHE_TTL_SECONDS", "42");
    let config = AppConfig::load(Some(file.path()));
    std::env::remove_var("HEADLINE_CACHE__MARKETS__CACHE_TTL_SECONDS");

    assert_eq!(config.unwrap().markets.cache_ttl_seconds, 42);
}
