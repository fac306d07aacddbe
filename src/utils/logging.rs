//! Structured logging and secret redaction.
//!
//! This module configures the `tracing` ecosystem for the application and
//! keeps the upstream API key out of log sinks: reqwest errors and upstream
//! error bodies may echo the full request URL, key included.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    static ref API_KEY_PARAM: Regex =
        Regex::new(r"(?i)(api_?key=)[^&\s\x22']+").expect("valid api key pattern");
}

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Replace every `apikey=` query value in `input` with `[REDACTED]`.
pub fn sanitize(input: &str) -> String {
    API_KEY_PARAM.replace_all(input, "${1}[REDACTED]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_query_key() {
        let input = "error sending request for url (https://gnews.io/api/v4/search?apikey=abc123&q=rio)";
        let output = sanitize(input);
        assert!(output.contains("apikey=[REDACTED]&q=rio"));
        assert!(!output.contains("abc123"));
    }

    #[test]
    fn test_sanitize_is_case_insensitive() {
        assert_eq!(sanitize("?API_KEY=xyz"), "?API_KEY=[REDACTED]");
        assert_eq!(sanitize("no secrets here"), "no secrets here");
    }
}
