//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path + referer path
//!     → router.rs (home page, primary prefixes, shared prefixes via referer)
//!     → matcher.rs (evaluate prefix conditions)
//!     → Return: exactly one OriginLabel
//!
//! Table compilation (at startup):
//!     profile table or rules file (table.rs, profiles.rs)
//!     → validated by config::validation
//!     → compiled into an immutable Router
//! ```
//!
//! # Design Decisions
//! - Tables compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same label
//! - First match wins (declared order)

pub mod matcher;
pub mod profiles;
pub mod router;
pub mod table;

pub use profiles::Profile;
pub use router::{MatchReason, RouteDecision, Router};
pub use table::{OriginLabel, PathRule, RouteTable};
