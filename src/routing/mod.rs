//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → matcher.rs (prefix check)
//!     → match: hand to the forwarder
//!     → no match: JSON 404, nothing sent upstream
//! ```
//!
//! # Design Decisions
//! - One static prefix, fixed at startup
//! - Deterministic: same path always gets the same decision

pub mod matcher;

pub use matcher::{Matcher, PathPrefixMatcher};
