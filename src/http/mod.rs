//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, prefix dispatch)
//!     → forward.rs (one upstream call per request)
//!         → upstream.rs (origin + path/query)
//!         → request.rs (upstream header set, body policy)
//!         → response.rs (outbound header set, JSON errors)
//!             → cookie.rs (Set-Cookie Domain stripping)
//!     → Send to client
//! ```

pub mod cookie;
pub mod error;
pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use error::ProxyError;
pub use forward::{Forwarder, ForwarderError};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
