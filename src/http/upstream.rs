//! The fixed upstream origin.

use axum::http::uri::InvalidUri;
use axum::http::{HeaderValue, Uri};
use url::Url;

use crate::config::UpstreamConfig;

/// Error type for resolving the upstream origin.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },
}

/// Resolved upstream target, built once at startup.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Origin without a trailing slash, e.g. `https://bags-shop.runasp.net`.
    origin: String,
    /// Value sent as `Host`: the hostname, plus `:port` when the origin names
    /// a non-default port.
    host: HeaderValue,
}

impl Upstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let invalid = |reason: String| UpstreamError::InvalidOrigin {
            origin: config.origin.clone(),
            reason,
        };

        let url = Url::parse(&config.origin).map_err(|e| invalid(e.to_string()))?;
        let hostname = url
            .host_str()
            .ok_or_else(|| invalid("origin has no host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", hostname, port),
            None => hostname.to_string(),
        };
        let host = HeaderValue::from_str(&authority).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            origin: config.origin.trim_end_matches('/').to_string(),
            host,
        })
    }

    /// Target URI for an inbound path and query, concatenated verbatim.
    ///
    /// Parsed as an `http::Uri`, which keeps the bytes as given: no
    /// percent-encoding is added and dot segments are left in place.
    pub fn uri_for(&self, path_and_query: &str) -> Result<Uri, InvalidUri> {
        format!("{}{}", self.origin, path_and_query).parse()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn host(&self) -> &HeaderValue {
        &self.host
    }
}
