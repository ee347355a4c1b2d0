//! HTTP server lifecycle
//!
//! The server stops accepting connections on SIGINT/SIGTERM and waits for
//! in-flight requests. If they have not finished within the shutdown timeout,
//! [`serve`] gives up with an error so the process exits non-zero.

use anyhow::Context;
use axum::Router;
use std::{future::IntoFuture, time::Duration};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Binds `address` and serves `app` until shutdown
pub async fn run(app: Router, address: &str, shutdown_timeout: Duration) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(address = %address, "Server listening");

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    serve(listener, app, cancel_token, shutdown_timeout).await
}

/// Serves `app` on `listener` until `cancel_token` is cancelled
///
/// # Errors
///
/// Fails if the server errors or if draining takes longer than
/// `shutdown_timeout`.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cancel_token: CancellationToken,
    shutdown_timeout: Duration,
) -> anyhow::Result<()> {
    let graceful = {
        let token = cancel_token.clone();
        async move { token.cancelled().await }
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();

    let deadline = async {
        cancel_token.cancelled().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => {
            result.context("Server error")?;
            tracing::info!("Server stopped");
            Ok(())
        }
        _ = deadline => {
            tracing::error!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Graceful shutdown timed out, forcing exit"
            );
            anyhow::bail!(
                "Graceful shutdown did not finish within {}s",
                shutdown_timeout.as_secs()
            )
        }
    }
}

/// Cancels `cancel_token` on Ctrl+C or SIGTERM
pub async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping...");
    cancel_token.cancel();
}
