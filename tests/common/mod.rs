//! Shared utilities for integration testing.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use forward_relay::{HttpServer, RelayConfig, Shutdown};
use tokio::net::TcpListener;

/// Start an in-process upstream on an ephemeral port.
///
/// Routes:
/// - `/echo`: body echoed back, method and URI in `x-echo-method`/`x-echo-uri`
/// - `/headers`: JSON object of header name to every received value
/// - `/status/{code}`: responds with that status
/// - `/cookies`: two `Set-Cookie` values
/// - `/redirect`: 302 to `/echo`
pub async fn start_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/echo", any(echo))
        .route("/headers", any(headers))
        .route("/status/{code}", any(status))
        .route("/cookies", get(cookies))
        .route("/redirect", get(redirect));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn echo(method: Method, uri: Uri, body: Body) -> Response {
    (
        [
            ("x-echo-method", method.to_string()),
            ("x-echo-uri", uri.to_string()),
        ],
        body,
    )
        .into_response()
}

async fn headers(headers: HeaderMap) -> Json<BTreeMap<String, Vec<String>>> {
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        seen.entry(name.to_string())
            .or_default()
            .push(value.to_str().unwrap_or_default().to_string());
    }
    Json(seen)
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap();
    (status, format!("status {}", code)).into_response()
}

async fn cookies() -> Response {
    let mut response = "cookies".into_response();
    let headers = response.headers_mut();
    headers.append(header::SET_COOKIE, "a=1".parse().unwrap());
    headers.append(header::SET_COOKIE, "b=2".parse().unwrap());
    response
}

async fn redirect() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/echo")]).into_response()
}

/// A running relay and the handle that stops it.
pub struct Relay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Relay {
    /// URL on the relay that targets `target`.
    pub fn url_for(&self, target: &str) -> String {
        format!("http://{}/{}", self.addr, target)
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a relay on an ephemeral port.
pub async fn start_relay(mut config: RelayConfig) -> Relay {
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Relay { addr, shutdown }
}

/// Test client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
