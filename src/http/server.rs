//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (request ID, tracing, concurrency limit, optional
//!   compression)
//! - Bind server to listener with graceful shutdown
//! - Dispatch prefix-matched requests to the forwarder under the request
//!   deadline, answering an expired deadline with the JSON error body

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::forward::{Forwarder, ForwarderError};
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::routing::{Matcher, PathPrefixMatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub matcher: Arc<dyn Matcher>,
    pub request_timeout: Duration,
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ForwarderError> {
        let forwarder = Arc::new(Forwarder::new(&config)?);
        let matcher: Arc<dyn Matcher> =
            Arc::new(PathPrefixMatcher::new(config.upstream.path_prefix.clone()));

        tracing::info!(
            upstream = %forwarder.upstream().origin(),
            prefix = %config.upstream.path_prefix,
            body_mode = ?forwarder.body_mode(),
            "Forwarder ready"
        );

        let state = AppState {
            forwarder,
            matcher,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let router = Router::new().fallback(proxy_handler).with_state(state);

        let router = if config.http.compress_responses {
            router.layer(CompressionLayer::new())
        } else {
            router
        };

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(GlobalConcurrencyLimitLayer::new(
                    config.listener.max_concurrent_requests,
                )),
        )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Checks the prefix and forwards matching requests upstream.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = if state.matcher.matches(&request) {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "Proxying request");
        match tokio::time::timeout(state.request_timeout, state.forwarder.forward(request)).await {
            Ok(response) => response,
            Err(_) => {
                let err = ProxyError::Deadline(state.request_timeout);
                tracing::error!(
                    request_id = %request_id,
                    kind = err.kind(),
                    error = %err,
                    "Proxy error"
                );
                metrics::record_proxy_error(err.kind());
                err.into_response()
            }
        }
    } else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        ProxyError::NoRoute(path.clone()).into_response()
    };

    let status = response.status();
    metrics::record_request(method.as_str(), status.as_u16(), start_time);
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status.as_u16(),
        elapsed_ms = millis(start_time.elapsed()),
        "Request completed"
    );

    response
}

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
