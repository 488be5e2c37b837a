//! HTTP exposure for the session store
//!
//! The store itself has no wire format; this module is the thin adapter
//! that gives it one. Not-found maps to 404, a stale version tag to 412,
//! and every successful read or write echoes the current tag in the `ETag`
//! response header.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::build_router;

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

use crate::core::SessionRepository;

/// Serve the API with graceful shutdown
///
/// This will bind to the provided address, start serving requests, and
/// handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown.
pub async fn serve(repository: Arc<dyn SessionRepository>, addr: &str) -> Result<()> {
    let app = build_router(repository);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
