//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    response::IntoResponse,
    Router,
};
use tokio::net::TcpListener;

use ilr_reverse_proxy::config::{load_config, LoadOptions};
use ilr_reverse_proxy::routing::Profile;
use ilr_reverse_proxy::{HttpServer, Shutdown};

/// Headers the echo backend reports back, prefixed with `x-echo-`.
const ECHOED: &[&str] = &[
    "host",
    "x-forwarded-proto",
    "x-forwarded-host",
    "x-forwarded-for",
    "connection",
    "te",
];

/// Start a backend that answers every request with `name` as the body and
/// the received forwarding headers mirrored as `x-echo-*` response headers.
///
/// Returns the bound address.
#[allow(dead_code)]
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let app = Router::new().fallback(move |request: Request| async move {
        let mut headers = HeaderMap::new();
        for key in ECHOED {
            if let Some(value) = request.headers().get(*key) {
                let echoed = HeaderName::from_bytes(format!("x-echo-{key}").as_bytes()).unwrap();
                headers.insert(echoed, value.clone());
            }
        }
        headers.insert(
            "x-echo-path",
            HeaderValue::from_str(&request.uri().to_string()).unwrap(),
        );
        // Upstream tries to claim the source; the proxy must overwrite it.
        headers.insert("x-ilr-proxy-source", HeaderValue::from_static("spoofed"));
        (headers, name).into_response()
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A running proxy under test.
#[allow(dead_code)]
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestProxy {
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy for `profile` with the given origins.
#[allow(dead_code)]
pub async fn start_proxy(
    profile: Profile,
    latest: Option<SocketAddr>,
    legacy: SocketAddr,
) -> TestProxy {
    let mut env = HashMap::new();
    if let Some(latest) = latest {
        env.insert("DRUPAL_LATEST_URL", format!("http://{latest}"));
    }
    env.insert("DRUPAL_LEGACY_URL", format!("http://{legacy}"));
    env.insert("PORT", "0".to_string());
    env.insert("UPSTREAM_CONNECT_TIMEOUT_SECS", "1".to_string());
    env.insert("UPSTREAM_TIMEOUT_SECS", "5".to_string());

    let options = LoadOptions {
        profile,
        rules: None,
    };
    let config = load_config(&options, |key: &str| env.get(key).cloned()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    TestProxy { addr, shutdown }
}

/// A client that keeps the proxy's responses as-is.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
