// GNews API client
// Author: kelexine (https://github.com/kelexine)

use super::NewsSource;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result, UpstreamError};
use crate::models::{FeedQuery, UpstreamPayload};
use crate::utils::logging::sanitize;
use crate::utils::throttle::{is_throttle_status, parse_retry_after};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Longest `Retry-After` hint we accept from the upstream.
const RETRY_AFTER_CAP: Duration = Duration::from_secs(15 * 60);
/// Error bodies are cut to this many characters before logging.
const ERROR_BODY_CHARS: usize = 200;

/// Client for the GNews v4 API (`top-headlines` and `search`).
pub struct GNewsClient {
    http_client: Client,
    config: UpstreamConfig,
    api_key: String,
}

impl GNewsClient {
    /// Build a client. Fails without an API key.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| AppError::Config("upstream.api_key is required".into()))?
            .to_string();

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .use_rustls_tls()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: config.clone(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, query: &FeedQuery) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            query.endpoint.path()
        )
    }

    /// Extract the error message from a GNews error body:
    /// `{"errors": ["..."]}` or `{"errors": {"field": "..."}}`.
    fn extract_error_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let messages: Vec<String> = match value.get("errors")? {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            serde_json::Value::Object(map) => map
                .values()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            serde_json::Value::String(s) => vec![s.clone()],
            _ => Vec::new(),
        };
        if messages.is_empty() {
            None
        } else {
            Some(messages.join("; "))
        }
    }
}

fn map_transport(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(sanitize(&err.to_string()))
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[async_trait]
impl NewsSource for GNewsClient {
    async fn fetch(&self, query: &FeedQuery) -> std::result::Result<UpstreamPayload, UpstreamError> {
        let url = self.url(query);

        let mut params = query.params();
        params
            .entry("max")
            .or_insert_with(|| self.config.max_results.to_string());
        params.insert("lang", self.config.lang.clone());
        params.insert("country", self.config.country.clone());
        params.insert("apikey", self.api_key.clone());

        debug!("Calling {} with {:?}", url, query.params());

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| parse_retry_after(v, RETRY_AFTER_CAP));
            let text = response.text().await.unwrap_or_default();
            let code = status.as_u16();

            if is_throttle_status(code) {
                return Err(UpstreamError::Throttled {
                    status: code,
                    retry_after,
                });
            }

            let message = Self::extract_error_message(&text).unwrap_or(text);
            return Err(UpstreamError::Status {
                status: code,
                body: truncate(&sanitize(&message), ERROR_BODY_CHARS),
            });
        }

        let body = response.text().await.map_err(map_transport)?;
        let payload = UpstreamPayload::from_body(&body)?;
        debug!("{} returned {} articles", query.endpoint, payload.articles.len());
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = UpstreamConfig::default();
        assert!(GNewsClient::new(&config).is_err());
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            GNewsClient::extract_error_message(r#"{"errors": ["Quota exceeded"]}"#).as_deref(),
            Some("Quota exceeded")
        );
        assert_eq!(
            GNewsClient::extract_error_message(r#"{"errors": {"q": "Missing query"}}"#).as_deref(),
            Some("Missing query")
        );
        assert!(GNewsClient::extract_error_message("not json").is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
