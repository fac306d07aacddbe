//! Upstream news API wire types.
//!
//! The upstream contract is a JSON object with an `articles` array of
//! `{title, description, content, url, image, publishedAt, source}`. Bodies
//! are parsed loosely (missing or `null` strings default to empty) and then
//! checked by [`UpstreamPayload::from_body`]. A bad article is dropped on
//! its own; only a body without an `articles` array becomes a recoverable
//! [`UpstreamError::Malformed`].

// Author: kelexine (https://github.com/kelexine)

use crate::error::UpstreamError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

/// Article as returned by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: ArticleSource,
}

impl RawArticle {
    /// Publication instant, if present and RFC 3339.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    total_articles: Option<u64>,
    articles: Vec<Value>,
}

/// A validated upstream response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamPayload {
    pub total_articles: u64,
    pub articles: Vec<RawArticle>,
}

impl UpstreamPayload {
    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self {
            total_articles: articles.len() as u64,
            articles,
        }
    }

    /// Parse and validate a response body.
    ///
    /// Articles that do not parse, or have no title to deduplicate on, are
    /// dropped. A body without an `articles` array is malformed.
    pub fn from_body(body: &str) -> Result<Self, UpstreamError> {
        let wire: WireResponse = serde_json::from_str(body)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        let articles: Vec<RawArticle> = wire
            .articles
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<RawArticle>(value) {
                Ok(article) => Some(article),
                Err(e) => {
                    debug!("Skipping unreadable article: {}", e);
                    None
                }
            })
            .filter(|a| !a.title.trim().is_empty())
            .collect();

        Ok(Self {
            total_articles: wire.total_articles.unwrap_or(articles.len() as u64),
            articles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_wire_format() {
        let body = r#"{
            "totalArticles": 2,
            "articles": [
                {
                    "title": "Primeira",
                    "description": "Resumo",
                    "content": "Texto",
                    "url": "https://example.com/1",
                    "image": "https://example.com/1.jpg",
                    "publishedAt": "2025-01-15T12:00:00Z",
                    "source": {"name": "Folha", "url": "https://folha.uol.com.br"}
                },
                {"title": "Segunda", "url": "https://example.com/2", "source": {"name": "G1"}}
            ]
        }"#;

        let payload = UpstreamPayload::from_body(body).unwrap();
        assert_eq!(payload.total_articles, 2);
        assert_eq!(payload.articles.len(), 2);
        assert_eq!(payload.articles[0].source.name, "Folha");
        assert!(payload.articles[0].published().is_some());
        assert!(payload.articles[1].published().is_none());
        assert!(payload.articles[1].image.is_none());
    }

    #[test]
    fn test_untitled_articles_are_dropped() {
        let body = r#"{"articles": [{"title": "  "}, {"title": "Ok"}]}"#;
        let payload = UpstreamPayload::from_body(body).unwrap();
        assert_eq!(payload.articles.len(), 1);
        assert_eq!(payload.total_articles, 1);
    }

    #[test]
    fn test_bad_date_does_not_reject_payload() {
        let body = r#"{"articles": [{"title": "Ok", "publishedAt": "ontem"}]}"#;
        let payload = UpstreamPayload::from_body(body).unwrap();
        assert!(payload.articles[0].published().is_none());
    }

    #[test]
    fn test_shape_mismatch_is_malformed() {
        for body in ["", "[]", r#"{"errors": ["quota"]}"#, r#"{"articles": "nope"}"#] {
            let err = UpstreamPayload::from_body(body).unwrap_err();
            assert_eq!(err.reason(), "malformed", "body: {body}");
        }
    }

    #[test]
    fn test_null_fields_and_bad_entries_are_isolated() {
        let body = r#"{"articles": [
            {"title": "Ok", "url": "https://example.com/ok", "source": {"name": "G1"}},
            {"title": "Dois", "url": null, "source": null, "description": null},
            {"title": null},
            {"title": 42, "url": "https://example.com/3"},
            "lixo"
        ]}"#;

        let payload = UpstreamPayload::from_body(body).unwrap();
        let titles: Vec<&str> = payload.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Ok", "Dois"]);
        assert_eq!(payload.articles[1].url, "");
        assert_eq!(payload.articles[1].source, ArticleSource::default());
        assert!(payload.articles[1].description.is_none());
    }
}
