//! Route matching logic.
//!
//! # Responsibilities
//! - Decide whether a request belongs to the proxied prefix
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A prefix ending in `/` also matches the bare path without it
//!   (`/api/` matches `/api`)
//! - No regex, prefix comparison only

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix test on a raw path.
    pub fn matches_path(&self, path: &str) -> bool {
        if path.starts_with(&self.prefix) {
            return true;
        }
        match self.prefix.strip_suffix('/') {
            Some(bare) if !bare.is_empty() => path == bare,
            _ => false,
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}
