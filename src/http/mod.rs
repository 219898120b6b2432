//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route, request ID, tracing)
//!     → routing layer picks an origin from path + referer
//!     → request.rs (forwarding headers, target scheme/host)
//!     → upstream client forwards once
//!     → response.rs (strip hop-by-hop, X-ILR-Proxy-Source)
//!     → Send to client
//!
//! On forward failure:
//!     → error.rs (log one line with the path, answer 502/504)
//! ```

pub mod error;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use error::{report_proxy_error, ProxyError};
pub use request::RequestRewriter;
pub use response::annotate_response;
pub use server::{AppState, HttpServer};
