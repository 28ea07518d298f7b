//! Forwarding a single request to the upstream origin.
//!
//! # Data Flow
//! ```text
//! inbound Request<Body>
//!     → Upstream::uri_for (origin + path/query, byte for byte)
//!     → request::upstream_headers (Host pinned, X-Forwarded-Host, no Content-Length)
//!     → body: none for GET/HEAD, else buffered bytes or the piped inbound stream
//!     → hyper client behind DecompressionLayer (redirects never followed)
//!     → response::outbound_headers (Set-Cookie Domain stripped, encoding/length dropped)
//!     → Response<Body> with the upstream status and body
//! ```
//!
//! Any failure on the way becomes a [`ProxyError`], answered as JSON.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::{Decompression, DecompressionLayer};

use crate::config::{BodyMode, ProxyConfig};
use crate::http::error::ProxyError;
use crate::http::request::{body_allowed, inbound_host, request_id, upstream_headers};
use crate::http::response::outbound_headers;
use crate::http::upstream::{Upstream, UpstreamError};
use crate::observability::metrics;

/// Upstream client: hyper over rustls, decoding compressed bodies.
///
/// hyper never follows redirects, so 3xx responses reach the caller as-is.
pub type UpstreamClient = Decompression<Client<HttpsConnector<HttpConnector>, Body>>;

/// Error type for building a [`Forwarder`].
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("failed to set up upstream TLS: {0}")]
    Tls(#[from] rustls::Error),
}

/// Relays requests to the configured upstream. Holds no per-request state.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    upstream: Upstream,
    body_mode: BodyMode,
    max_body_bytes: usize,
    upstream_timeout: Duration,
}

impl Forwarder {
    pub fn new(config: &ProxyConfig) -> Result<Self, ForwarderError> {
        let upstream = Upstream::from_config(&config.upstream)?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_nodelay(true);
        http.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));

        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = ServiceBuilder::new()
            .layer(DecompressionLayer::new())
            .service(Client::builder(TokioExecutor::new()).build(https));

        Ok(Self {
            client,
            upstream,
            body_mode: config.upstream.body_mode,
            max_body_bytes: config.upstream.max_body_bytes,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        })
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    pub fn body_mode(&self) -> BodyMode {
        self.body_mode
    }

    /// Forward one request. Never fails: transport problems come back as a
    /// JSON error response.
    pub async fn forward(&self, request: Request<Body>) -> Response<Body> {
        let request_id = request_id(request.headers()).to_string();
        match self.try_forward(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    upstream = %self.upstream.origin(),
                    kind = e.kind(),
                    error = %e,
                    "Proxy error"
                );
                metrics::record_proxy_error(e.kind());
                e.into_response()
            }
        }
    }

    async fn try_forward(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let host = inbound_host(&request);
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let uri = self.upstream.uri_for(path_and_query)?;
        let headers = upstream_headers(&parts.headers, host, self.upstream.host());

        tracing::debug!(method = %parts.method, uri = %uri, "Forwarding upstream");

        let body = if !body_allowed(&parts.method) {
            Body::empty()
        } else {
            match self.body_mode {
                BodyMode::Buffered => Body::from(
                    axum::body::to_bytes(body, self.max_body_bytes)
                        .await
                        .map_err(|e| ProxyError::from_request_body(e, self.max_body_bytes))?,
                ),
                BodyMode::Streamed => body,
            }
        };

        let mut upstream_request = Request::new(body);
        *upstream_request.method_mut() = parts.method;
        *upstream_request.uri_mut() = uri;
        *upstream_request.headers_mut() = headers;

        // Buffered mode bounds the whole exchange; streamed mode bounds the
        // response head and leaves the body to flow.
        let client = self.client.clone();
        let body_mode = self.body_mode;
        let exchange = async move {
            let upstream_response = client
                .oneshot(upstream_request)
                .await
                .map_err(ProxyError::from_upstream)?;
            let (head, body) = upstream_response.into_parts();
            let body = match body_mode {
                BodyMode::Buffered => Body::from(
                    body.collect()
                        .await
                        .map_err(ProxyError::Response)?
                        .to_bytes(),
                ),
                BodyMode::Streamed => Body::new(body),
            };
            Ok::<_, ProxyError>((head, body))
        };

        let (head, body) = tokio::time::timeout(self.upstream_timeout, exchange)
            .await
            .map_err(|_| ProxyError::Timeout(self.upstream_timeout))??;

        let mut response = Response::new(body);
        *response.status_mut() = head.status;
        *response.headers_mut() = outbound_headers(&head.headers);
        Ok(response)
    }
}
