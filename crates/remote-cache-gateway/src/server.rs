//! Server startup and lifecycle

use crate::{routes, AppState, GatewayConfig};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the gateway until the process is killed
pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    run_server_with_shutdown(config, std::future::pending()).await
}

/// Run the gateway until `shutdown_signal` resolves, then drain in-flight requests.
///
/// State is assembled before the listener is bound, so a missing setting
/// aborts startup without ever accepting a request.
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    let expiry_secs = state.config.presign_expiry_secs;

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, expiry_secs, "Remote cache gateway listening");

    axum::serve(listener, routes::create_router(state))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Gateway shutdown complete");
    Ok(())
}
