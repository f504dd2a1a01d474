//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handler
//! - Wire up middleware (tracing, CORS, panic boundary)
//! - Build the shared outbound client from config
//! - Bind server to listener and stop on shutdown

use std::any::Any;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use reqwest::redirect::Policy;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::{RelayConfig, UpstreamConfig};
use crate::http::cors;
use crate::http::error::RelayResult;
use crate::http::landing;
use crate::http::request::{build_outbound, TargetUrl};
use crate::http::response::relay_response;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared outbound client; its connection pool is safe to use concurrently.
    pub client: reqwest::Client,
    /// Force `Accept-Encoding: gzip` toward upstreams for gzip-capable callers.
    pub force_gzip: bool,
}

impl AppState {
    pub fn from_config(config: &UpstreamConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            force_gzip: config.force_gzip,
        })
    }
}

/// Build the outbound client. No timeout or retry policy is imposed.
fn build_client(config: &UpstreamConfig) -> reqwest::Result<reqwest::Client> {
    let redirect = if config.follow_redirects {
        Policy::limited(config.max_redirects)
    } else {
        Policy::none()
    };

    reqwest::Client::builder().redirect(redirect).build()
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> reqwest::Result<Self> {
        let state = AppState::from_config(&config.upstream)?;
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// CORS sits outside the panic boundary so recovered panics carry the
    /// same headers as every other response.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(relay_handler)
            .with_state(state)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::map_response(cors::apply_cors_headers))
            .layer(TraceLayer::new_for_http())
    }

    /// A handle to the router, for serving it somewhere other than [`run`](Self::run).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            force_gzip = self.config.upstream.force_gzip,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main relay handler.
/// Answers preflights and the landing page, relays everything else.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    if request.uri().path() == "/" {
        return landing::landing_page();
    }

    match relay(&state, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn relay(state: &AppState, request: Request<Body>) -> RelayResult<Response> {
    let target = TargetUrl::from_path(request.uri().path(), request.uri().query())?;

    tracing::debug!(
        method = %request.method(),
        target = %target,
        "Relaying request"
    );

    let outbound = build_outbound(&target, request, state.force_gzip)?;
    let upstream = state.client.execute(outbound).await?;

    tracing::debug!(
        target = %target,
        status = %upstream.status(),
        "Upstream responded"
    );

    Ok(relay_response(upstream))
}

/// Convert a panic inside the handler stack into a 500.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Relay handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("internal server error: {}", detail),
    )
        .into_response()
}
