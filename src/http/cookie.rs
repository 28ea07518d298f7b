//! `Set-Cookie` rewriting.
//!
//! Upstream cookies carry a `Domain` attribute naming the upstream host. A
//! browser talking to the proxy would reject (or mis-scope) such a cookie, so
//! the attribute is removed and the cookie falls back to the proxy's own
//! origin.
//!
//! The value is parsed as `name=value` followed by `;`-separated attributes.
//! Only an attribute whose key is `Domain` is dropped; the leading pair is
//! never inspected, so a cookie whose name or value mentions `Domain=` stays
//! intact.

use axum::http::HeaderValue;

/// Remove the `Domain` attribute from a `Set-Cookie` header value.
///
/// Values without a `Domain` attribute, and values that are not visible
/// ASCII, are returned unchanged.
pub fn strip_domain(value: &HeaderValue) -> HeaderValue {
    let Ok(text) = value.to_str() else {
        return value.clone();
    };
    match strip_domain_str(text) {
        Some(rewritten) => HeaderValue::from_str(&rewritten).unwrap_or_else(|_| value.clone()),
        None => value.clone(),
    }
}

/// Rewrite a cookie string, or `None` when it has no `Domain` attribute.
pub fn strip_domain_str(cookie: &str) -> Option<String> {
    let mut segments = cookie.split(';');
    let pair = segments.next().unwrap_or_default();
    let attributes: Vec<&str> = segments.collect();

    if !attributes.iter().any(|attr| is_domain(attr)) {
        return None;
    }

    let mut out = String::with_capacity(cookie.len());
    out.push_str(pair.trim());
    for attr in attributes {
        let attr = attr.trim();
        if attr.is_empty() || is_domain(attr) {
            continue;
        }
        out.push_str("; ");
        out.push_str(attr);
    }
    Some(out)
}

fn is_domain(attribute: &str) -> bool {
    let key = attribute.split('=').next().unwrap_or_default();
    key.trim().eq_ignore_ascii_case("domain")
}
