//! Request handling and transformation.
//!
//! # Responsibilities
//! - Extract routing-relevant information (decoded path, decoded referer path)
//! - Derive the forwarding headers (proto, host, client chain)
//! - Point the request at the chosen origin (scheme, authority, `Host`)
//!
//! # Design Decisions
//! - The forwarded proto never changes how the origin is dialed
//! - A referer that does not parse counts as no referer
//! - Routing paths are percent-decoded but never normalized: `..` and `.`
//!   segments are matched as written
//! - Only the in-flight request is touched

use std::net::IpAddr;

use axum::body::Body;
use axum::http::header::{HOST, REFERER};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request, Uri, Version};
use percent_encoding::percent_decode_str;

use crate::config::{ForwardedHostMode, ForwardingConfig};
use crate::http::error::ProxyError;
use crate::http::headers::{
    append_forwarded_for, strip_hop_by_hop, X_FORWARDED_HOST, X_FORWARDED_PROTO,
};
use crate::upstream::Origin;

/// Rewrites inbound requests into outbound requests for an origin.
#[derive(Debug, Clone, Default)]
pub struct RequestRewriter {
    config: ForwardingConfig,
}

impl RequestRewriter {
    pub fn new(config: ForwardingConfig) -> Self {
        Self { config }
    }

    /// Build the outbound request for `origin`.
    pub fn rewrite(
        &self,
        request: Request<Body>,
        origin: &Origin,
        client_ip: Option<IpAddr>,
    ) -> Result<Request<Body>, ProxyError> {
        let (mut parts, body) = request.into_parts();

        let inbound_host = inbound_host(&parts);
        let proto = forwarded_proto(&parts.headers);

        strip_hop_by_hop(&mut parts.headers);

        if self.config.forwarded_proto {
            parts.headers.insert(X_FORWARDED_PROTO, proto);
        }

        if let Some(host) = inbound_host {
            match self.config.forwarded_host {
                ForwardedHostMode::Overwrite => {
                    parts.headers.insert(X_FORWARDED_HOST, host);
                }
                ForwardedHostMode::IfAbsent => {
                    if !parts.headers.contains_key(X_FORWARDED_HOST) {
                        parts.headers.insert(X_FORWARDED_HOST, host);
                    }
                }
                ForwardedHostMode::Off => {}
            }
        }

        if self.config.forwarded_for {
            if let Some(ip) = client_ip {
                append_forwarded_for(&mut parts.headers, ip);
            }
        }

        parts.uri = origin.target_uri(&parts.uri)?;
        parts.version = Version::HTTP_11;
        parts.headers.insert(HOST, origin.host_header().clone());

        Ok(Request::from_parts(parts, body))
    }
}

/// Client-facing protocol: the inbound `X-Forwarded-Proto` if non-empty,
/// otherwise `http`.
pub fn forwarded_proto(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(X_FORWARDED_PROTO)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("http"))
}

/// The host the client asked for: the `Host` header, or the request-target
/// authority for HTTP/2.
fn inbound_host(parts: &Parts) -> Option<HeaderValue> {
    parts.headers.get(HOST).cloned().or_else(|| {
        parts
            .uri
            .authority()
            .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
    })
}

/// Decoded path component of the `Referer` header, or `""` when absent or
/// unparsable.
pub fn referer_path(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse::<Uri>().ok())
        // Absolute and origin-form referers only; "news/today" is not a path.
        .filter(|uri| uri.scheme().is_some() || uri.authority().is_none())
        .map(|uri| decode_path(uri.path()))
        .unwrap_or_default()
}

/// Percent-decode a path for matching.
///
/// Escapes that do not decode (`%zz`, a trailing `%`) are kept literally and
/// invalid UTF-8 is replaced.
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
