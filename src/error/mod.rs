// Error types for headline-cache
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure talking to the upstream news API.
///
/// None of these reach a caller of the news operations; every variant is
/// masked by synthetic content. They exist so the masking can be logged
/// and counted by reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("upstream throttled the request (HTTP {status})")]
    Throttled {
        status: u16,
        retry_after: Option<Duration>,
    },

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed upstream payload: {0}")]
    Malformed(String),

    #[error("upstream cooling down for another {0:?}")]
    CoolingDown(Duration),

    #[error("upstream returned only titles that were already published")]
    Exhausted,

    #[error("no upstream configured")]
    Unavailable,

    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl UpstreamError {
    /// Short label used as a metric dimension and log field.
    pub fn reason(&self) -> &'static str {
        match self {
            UpstreamError::Throttled { .. } => "throttled",
            UpstreamError::Status { status, .. } if *status >= 500 => "server_error",
            UpstreamError::Status { .. } => "client_error",
            UpstreamError::Timeout => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Malformed(_) => "malformed",
            UpstreamError::CoolingDown(_) => "cooldown",
            UpstreamError::Exhausted => "exhausted",
            UpstreamError::Unavailable => "unavailable",
            UpstreamError::Queue(e) => e.reason(),
        }
    }
}

/// Failure of a queued task as seen by the caller that enqueued it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueueError {
    #[error("queued task exceeded {0:?}")]
    TimedOut(Duration),

    #[error("queued task aborted before completing")]
    Aborted,

    #[error("request queue is closed")]
    Closed,
}

impl QueueError {
    pub fn reason(&self) -> &'static str {
        match self {
            QueueError::TimedOut(_) => "timeout",
            QueueError::Aborted => "aborted",
            QueueError::Closed => "queue_closed",
        }
    }
}

// Convert AppError to HTTP responses for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found_error"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            AppError::Config(_) | AppError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            AppError::Http(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
