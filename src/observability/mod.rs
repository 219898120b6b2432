//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (startup lines, route decisions, proxy errors)
//!     → tower-http spans per request, tagged with x-request-id
//!
//! logging.rs installs the subscriber:
//!     → stdout, pretty or JSON
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows from the inbound request to the upstream and back
//! - No process-wide counters

pub mod logging;
