//! Storefront edge proxy library.
//!
//! Relays `/api/*` requests from the storefront's own origin to the fixed
//! e-commerce upstream, rewriting `Host`, `X-Forwarded-Host` and the
//! `Domain` attribute of upstream cookies.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::{Forwarder, HttpServer};
pub use lifecycle::Shutdown;
