//! OS signal handling.

/// Wait for Ctrl+C.
///
/// If the handler cannot be installed the relay keeps running and only
/// stops when the process is killed.
pub async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
