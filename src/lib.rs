//! ILR path-routing reverse proxy library.
//!
//! Splits one public site across two Drupal origins (Latest and Legacy) by
//! request path, falling back to the `Referer` path for shared endpoints.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
