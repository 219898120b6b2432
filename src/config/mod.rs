//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional) + process environment
//!     → loader.rs (origins, port, listen address, timeouts)
//! --profile / --rules (TOML)
//!     → loader.rs (route table, forwarding headers)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all request handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Any configuration error is fatal at startup
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError, LoadOptions};
pub use schema::{
    ForwardedHostMode, ForwardingConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ProxyConfig, TimeoutConfig,
};
