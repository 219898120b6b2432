//! Forwarding errors and the error-reporting hook.
//!
//! # Design Decisions
//! - One log line per failed request, carrying the request path
//! - Timeouts answer 504, every other forward failure 502
//! - Failures never touch routing state or other requests

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::routing::OriginLabel;

/// Error raised while forwarding a single request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// DNS failure, refused connection, TLS failure or upstream reset.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The outbound request could not be built.
    #[error("invalid outbound request: {0}")]
    Request(#[from] axum::http::Error),

    /// The table resolved to a label with no configured origin.
    #[error("no origin configured for {0}")]
    NoOrigin(OriginLabel),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = status.canonical_reason().unwrap_or("Bad Gateway");
        (status, body).into_response()
    }
}

/// Error hook invoked when a forward attempt cannot complete.
pub fn report_proxy_error(error: &ProxyError, path: &str) {
    tracing::error!(path = %path, error = %error, detail = ?error, "Proxy error");
}
