//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler / forwarder produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log event of a request
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
