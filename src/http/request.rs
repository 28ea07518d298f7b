//! Request handling and transformation.
//!
//! # Responsibilities
//! - Request ID header shared with the tower-http request-id layers
//! - Decide whether a method carries a body upstream
//! - Derive the upstream header set from the inbound one
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Original request headers are never mutated; a rewritten copy is forwarded

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request};

use crate::http::headers::{strip_hop_by_hop, X_FORWARDED_HOST};

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id of a request, or `"unknown"` before the id layer ran.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// GET and HEAD never carry a body upstream, whatever the caller attached.
pub fn body_allowed(method: &Method) -> bool {
    !(method == Method::GET || method == Method::HEAD)
}

/// The host the caller addressed: the `Host` header, or the URI authority
/// for HTTP/2 requests that only carry `:authority`.
pub fn inbound_host<B>(request: &Request<B>) -> Option<HeaderValue> {
    if let Some(host) = request.headers().get(header::HOST) {
        return Some(host.clone());
    }
    request
        .uri()
        .authority()
        .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
}

/// Build the header set sent upstream.
///
/// Every inbound header is copied, then `Host` is pinned to the upstream,
/// `X-Forwarded-Host` records the host the caller used and `Content-Length`
/// is dropped so the client recomputes it from the body actually sent.
pub fn upstream_headers(
    inbound: &HeaderMap,
    inbound_host: Option<HeaderValue>,
    upstream_host: &HeaderValue,
) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);

    headers.insert(header::HOST, upstream_host.clone());
    match inbound_host {
        Some(host) => {
            headers.insert(X_FORWARDED_HOST, host);
        }
        None => {
            headers.remove(X_FORWARDED_HOST);
        }
    }
    headers
}
