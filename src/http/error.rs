//! Failures the proxy answers itself.

use std::time::Duration;

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use crate::http::response::error_response;

/// Boxed error carried by upstream response bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can stop a request from being relayed.
///
/// Upstream 4xx/5xx responses are not errors here; they are relayed as-is.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream connection failed: {0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    #[error("upstream timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("request exceeded the {}s deadline", .0.as_secs())]
    Deadline(Duration),

    #[error("invalid upstream target: {0}")]
    Target(#[from] InvalidUri),

    #[error("upstream request failed: {0}")]
    Request(#[source] hyper_util::client::legacy::Error),

    #[error("failed to read upstream response: {0}")]
    Response(#[source] BoxError),

    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("no route for path {0}")]
    NoRoute(String),
}

impl ProxyError {
    /// Classify a failed upstream call.
    pub fn from_upstream(err: hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            ProxyError::Connect(err)
        } else {
            ProxyError::Request(err)
        }
    }

    /// Classify a failed inbound body read against the buffering limit.
    pub fn from_request_body(err: axum::Error, limit: usize) -> Self {
        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
        while let Some(e) = source {
            if e.is::<LengthLimitError>() {
                return ProxyError::PayloadTooLarge { limit };
            }
            source = e.source();
        }
        ProxyError::Body(err)
    }

    /// Failure class reported in the JSON payload and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Connect(_) => "connect",
            ProxyError::Timeout(_) | ProxyError::Deadline(_) => "timeout",
            ProxyError::Target(_) | ProxyError::Request(_) => "request",
            ProxyError::Response(_) => "response",
            ProxyError::Body(_) => "body",
            ProxyError::PayloadTooLarge { .. } => "payload_too_large",
            ProxyError::NoRoute(_) => "no_route",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::NoRoute(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.kind(), self.to_string())
    }
}
