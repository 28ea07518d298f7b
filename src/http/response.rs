//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform upstream response headers for the caller
//! - Render proxy-side failures as JSON the browser can parse
//!
//! # Design Decisions
//! - Status and body are relayed untouched; only headers are rewritten
//! - `Content-Encoding`/`Content-Length` are dropped because the body handed
//!   to the caller is the decoded content and the outbound transport frames it
//! - Repeated headers (several `Set-Cookie` lines) stay separate occurrences

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::http::cookie;
use crate::http::headers::strip_hop_by_hop;

/// Build the header set relayed to the caller from the upstream's headers.
pub fn outbound_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut relayed = upstream.clone();
    strip_hop_by_hop(&mut relayed);
    relayed.remove(header::CONTENT_ENCODING);
    relayed.remove(header::CONTENT_LENGTH);

    let mut headers = HeaderMap::with_capacity(relayed.len());
    for (name, value) in relayed.iter() {
        if *name == header::SET_COOKIE {
            headers.append(name.clone(), cookie::strip_domain(value));
        } else {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// JSON payload returned whenever the proxy itself answers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    pub message: String,
}

/// Render an error payload with the given status.
pub fn error_response(status: StatusCode, kind: &'static str, message: String) -> Response {
    let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
        "Proxy Internal Error".to_string()
    } else {
        status.canonical_reason().unwrap_or("Error").to_string()
    };
    (status, Json(ErrorBody { error, kind, message })).into_response()
}
