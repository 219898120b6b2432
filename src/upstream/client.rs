//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Dial `http` and `https` origins (rustls, webpki roots)
//! - Enforce the connect timeout and the overall upstream timeout
//! - Perform exactly one forward attempt per request
//!
//! # Design Decisions
//! - Pooled hyper-util legacy client shared by all handlers (cheap to clone)
//! - Outbound requests are HTTP/1.1
//! - No retries and no failover: errors go straight back to the caller

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::TimeoutConfig;
use crate::http::error::ProxyError;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Client used to forward requests to origins.
#[derive(Clone)]
pub struct UpstreamClient {
    inner: HttpsClient,
    timeout: Duration,
}

impl UpstreamClient {
    /// Build a client from the timeout settings.
    pub fn new(config: &TimeoutConfig) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_secs)));

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let inner = Client::builder(TokioExecutor::new()).build(https);

        Self {
            inner,
            timeout: Duration::from_secs(config.upstream_secs),
        }
    }

    /// Forward a fully rewritten request.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Incoming>, ProxyError> {
        match tokio::time::timeout(self.timeout, self.inner.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ProxyError::Upstream(e)),
            Err(_) => Err(ProxyError::Timeout(self.timeout)),
        }
    }
}
