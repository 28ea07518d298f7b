//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream origin is a bare absolute http(s) origin
//! - Validate value ranges (timeouts > 0, limits > 0, addresses parse)
//! - Validate the request deadline outlasts connect + upstream timeouts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_concurrent_requests == 0 {
        errors.push(ValidationError::new(
            "listener.max_concurrent_requests",
            "must be greater than zero",
        ));
    }

    if let Err(reason) = check_origin(&config.upstream.origin) {
        errors.push(ValidationError::new("upstream.origin", reason));
    }
    if !config.upstream.path_prefix.starts_with('/') {
        errors.push(ValidationError::new(
            "upstream.path_prefix",
            format!("'{}' must start with '/'", config.upstream.path_prefix),
        ));
    }
    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::new(
            "upstream.max_body_bytes",
            "must be greater than zero",
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than zero"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than zero"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    } else {
        let inner = config
            .timeouts
            .connect_secs
            .saturating_add(config.timeouts.upstream_secs);
        if config.timeouts.request_secs <= inner {
            errors.push(ValidationError::new(
                "timeouts.request_secs",
                format!(
                    "{}s must exceed connect_secs + upstream_secs ({}s)",
                    config.timeouts.request_secs, inner
                ),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin(origin: &str) -> Result<(), String> {
    let url = Url::parse(origin).map_err(|e| format!("'{}' is not a URL: {}", origin, e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("scheme '{}' is not http or https", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("origin has no host".to_string());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(format!("'{}' must be a bare origin without path, query or fragment", origin));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("origin must not carry credentials".to_string());
    }
    Ok(())
}
