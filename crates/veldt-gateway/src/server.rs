//! Gateway server lifecycle management.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use veldt_core::EngineShared;

use crate::registry::ConnectionRegistry;
use crate::ws::ws_handler;

/// Shared state handed to every connection handler.
#[derive(Debug)]
pub struct GatewayState {
    /// The connection registry (outbound senders, tokens).
    pub registry: Arc<ConnectionRegistry>,
    /// The engine's queues and tick counter.
    pub shared: Arc<EngineShared>,
}

/// Errors that can occur when starting or running the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Build the gateway router.
pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the gateway and serve until the process terminates.
pub async fn start_server(port: u16, state: Arc<GatewayState>) -> Result<(), GatewayError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Gateway listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| GatewayError::Serve(format!("serve error: {e}")))?;

    Ok(())
}

/// Spawn the gateway on a background task.
pub async fn spawn_gateway(
    port: u16,
    state: Arc<GatewayState>,
) -> tokio::task::JoinHandle<Result<(), GatewayError>> {
    tokio::spawn(async move { start_server(port, state).await })
}
