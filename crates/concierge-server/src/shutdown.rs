//! Graceful shutdown.

use std::future::Future;
use std::io;

use tracing::{error, info};

/// Resolve once Ctrl-C is received.
pub async fn shutdown_signal() {
    wait_for(tokio::signal::ctrl_c()).await
}

/// Resolve when `signal` fires.
///
/// A handler that could not be installed never resolves, so the server keeps
/// serving instead of stopping right after it started.
async fn wait_for<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to install shutdown signal handler");
            std::future::pending::<()>().await;
        }
    }
}
