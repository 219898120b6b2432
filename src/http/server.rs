//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Serve on a listener until the shutdown signal fires
//! - Route each request, rewrite it, forward it once, annotate the response

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::{report_proxy_error, ProxyError};
use crate::http::request::{decode_path, referer_path, RequestRewriter};
use crate::http::response::prepare_response;
use crate::routing::Router as ProxyRouter;
use crate::upstream::{OriginSet, UpstreamClient};

/// Application state injected into handlers.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub origins: Arc<OriginSet>,
    pub rewriter: Arc<RequestRewriter>,
    pub client: UpstreamClient,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            router: Arc::new(ProxyRouter::new(&config.routing)),
            origins: Arc::new(config.origins.clone()),
            rewriter: Arc::new(RequestRewriter::new(config.forwarding.clone())),
            client: UpstreamClient::new(&config.timeouts),
        }
    }
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState::new(&config);
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The Axum router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Main proxy handler.
/// Resolves the origin, rewrites the request, forwards it once.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = decode_path(request.uri().path());
    let referer = referer_path(request.headers());
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let decision = state.router.decide(&path, &referer);

    tracing::debug!(
        method = %request.method(),
        path = %path,
        referer = %referer,
        origin = %decision.label,
        reason = ?decision.reason,
        "Route resolved"
    );

    let Some(origin) = state.origins.get(decision.label) else {
        return fail(ProxyError::NoOrigin(decision.label), &path);
    };

    let outbound = match state.rewriter.rewrite(request, origin, client_ip) {
        Ok(outbound) => outbound,
        Err(e) => return fail(e, &path),
    };

    match state.client.forward(outbound).await {
        Ok(response) => prepare_response(response, origin),
        Err(e) => fail(e, &path),
    }
}

fn fail(error: ProxyError, path: &str) -> Response {
    report_proxy_error(&error, path);
    error.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ListenerConfig, ObservabilityConfig, TimeoutConfig};
    use crate::routing::{OriginLabel, Profile};
    use crate::upstream::Origin;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn config_with_latest(latest: Option<&str>) -> ProxyConfig {
        let legacy = Origin::parse(OriginLabel::Legacy, "http://127.0.0.1:9").unwrap();
        let latest = latest.map(|url| Origin::parse(OriginLabel::Latest, url).unwrap());
        ProxyConfig {
            listener: ListenerConfig::default(),
            origins: OriginSet::new(legacy, latest),
            profile: Profile::LatestBiased,
            routing: Profile::LatestBiased.route_table(),
            forwarding: Profile::LatestBiased.forwarding(),
            timeouts: TimeoutConfig {
                connect_secs: 1,
                upstream_secs: 2,
            },
            observability: ObservabilityConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_origin_returns_bad_gateway() {
        let server = HttpServer::new(config_with_latest(Some("http://127.0.0.1:9")));

        let response = server
            .router()
            .oneshot(Request::builder().uri("/random-page").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unconfigured_label_returns_bad_gateway() {
        // Bypasses validation on purpose: the table needs a latest origin.
        let server = HttpServer::new(config_with_latest(None));

        let response = server
            .router()
            .oneshot(Request::builder().uri("/news").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
