//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! DRUPAL_LEGACY_URL / DRUPAL_LATEST_URL
//!     → origin.rs (parse, validate, pre-compute authority)
//!     → OriginSet (immutable, shared via Arc)
//!
//! Rewritten request
//!     → client.rs (dial origin, single attempt, timeouts)
//!     → upstream response or ProxyError
//! ```

pub mod client;
pub mod origin;

pub use client::UpstreamClient;
pub use origin::{Origin, OriginError, OriginSet};
