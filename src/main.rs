//! forward-relay
//!
//! An HTTP relay that takes its target from the request path.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client                        forward-relay                           Upstream
//!     ──────                        ─────────────                           ────────
//!     GET /https://host/p?q ──▶ ┌──────────────────────────────┐
//!                               │ trace → cors → catch_panic   │
//!                               │   OPTIONS → 200              │
//!                               │   "/"     → landing page     │
//!                               │   else    → extract target ──┼──▶ GET https://host/p?q
//!                               │             relay response ◀─┼─── status, headers, body
//!     ◀──────────────────────── └──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use forward_relay::config::load_config;
use forward_relay::lifecycle::{wait_for_signal, Shutdown};
use forward_relay::observability::init_logging;
use forward_relay::HttpServer;

#[derive(Parser)]
#[command(name = "forward-relay")]
#[command(about = "Relay HTTP requests to the URL embedded in their path", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config.observability);

    tracing::info!("forward-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        force_gzip = config.upstream.force_gzip,
        follow_redirects = config.upstream.follow_redirects,
        max_redirects = config.upstream.max_redirects,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
