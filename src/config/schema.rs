//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! Sections that can come from a rules file derive Serde traits; origins are
//! always parsed from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::routing::{Profile, RouteTable};
use crate::upstream::OriginSet;

/// Root configuration for the reverse proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Upstream origins, one per label.
    pub origins: OriginSet,

    /// Profile the table and forwarding defaults came from.
    pub profile: Profile,

    /// Path rule table compiled into the router.
    pub routing: RouteTable,

    /// Forwarding-header behavior.
    pub forwarding: ForwardingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Bind address (`LISTEN`).
    pub listen: IpAddr,

    /// TCP port (`PORT`).
    pub port: u16,
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            listen: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// How the outbound `X-Forwarded-Host` header is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForwardedHostMode {
    /// Always set it to the inbound host.
    #[default]
    Overwrite,
    /// Set it only when the inbound request does not carry one.
    IfAbsent,
    /// Leave it untouched.
    Off,
}

/// Forwarding-header configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// `X-Forwarded-Host` behavior.
    pub forwarded_host: ForwardedHostMode,

    /// Send `X-Forwarded-Proto` upstream.
    pub forwarded_proto: bool,

    /// Append the client IP to `X-Forwarded-For`.
    pub forwarded_for: bool,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            forwarded_host: ForwardedHostMode::Overwrite,
            forwarded_proto: true,
            forwarded_for: true,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for the upstream to produce response headers, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Filter directives used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "ilr_reverse_proxy=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Contents of a rules file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RulesFile {
    /// Replaces the profile's table.
    pub routing: RouteTable,

    /// Replaces the profile's forwarding settings when present.
    #[serde(default)]
    pub forwarding: Option<ForwardingConfig>,
}
