//! Concierge Server
//!
//! Serves errands and rides over HTTP, tracking each one as a remote job
//! when a job runner is configured and as a local simulation otherwise.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use concierge_core::TaskKind;
use concierge_jobs::BlaxelClient;
use concierge_server::delivery::{DeliveryProvider, DoorDashClient, SimulatedDeliveryProvider};
use concierge_server::http::create_router;
use concierge_server::shutdown::shutdown_signal;
use concierge_server::{AppState, Args, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let config = ServerConfig::from(Args::parse());

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("concierge=info")),
        )
        .with_target(true)
        .init();

    info!("Concierge server starting");

    let http_addr: SocketAddr = config.http_addr.parse()?;

    // Job runner; unconfigured kinds fall back to local simulation per request
    let runner = BlaxelClient::new(config.jobs.clone())?;
    for kind in TaskKind::ALL {
        if config.jobs.is_configured(kind) {
            info!(kind = %kind, api_url = %config.jobs.api_url, "Remote tracking enabled");
        } else {
            info!(kind = %kind, "Remote tracking not configured, using local simulation");
        }
    }

    // Courier
    let delivery: Arc<dyn DeliveryProvider> = match DoorDashClient::from_config(&config.doordash) {
        Ok(Some(client)) => {
            info!(api_url = %config.doordash.api_url, "DoorDash Drive enabled");
            Arc::new(client)
        }
        Ok(None) => {
            info!("DoorDash credentials not set, simulating deliveries");
            Arc::new(SimulatedDeliveryProvider)
        }
        Err(e) => {
            warn!(error = %e, "DoorDash credentials unusable, simulating deliveries");
            Arc::new(SimulatedDeliveryProvider)
        }
    };

    let state = AppState::new(Arc::new(runner), delivery);
    let router = create_router(state);

    let listener = TcpListener::bind(http_addr).await?;
    info!(addr = %http_addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Concierge server stopped");
    Ok(())
}
