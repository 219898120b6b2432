//! Startup orchestration.
//!
//! # Responsibilities
//! - Announce the configured origins and route table
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound only after configuration has loaded and validated

use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

/// Error type for binding and serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Log the origins and the route table.
pub fn log_config(config: &ProxyConfig) {
    tracing::info!("Drupal Legacy served from {}.", config.origins.legacy().url());
    if let Some(latest) = config.origins.latest() {
        tracing::info!("Drupal Latest served from {}.", latest.url());
    }

    tracing::info!(
        profile = %config.profile,
        rules = config.routing.rules.len(),
        shared = config.routing.shared.len(),
        default = %config.routing.default,
        home = ?config.routing.home,
        forwarded_host = ?config.forwarding.forwarded_host,
        forwarded_proto = config.forwarding.forwarded_proto,
        "Route table loaded"
    );

    for rule in &config.routing.rules {
        tracing::debug!(prefix = %rule.prefix, origin = %rule.origin, "Path rule");
    }
}

/// Bind the configured address and serve until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    log_config(&config);

    let addr = config.listener.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!("Listening on {}", addr);

    let server = HttpServer::new(config);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
