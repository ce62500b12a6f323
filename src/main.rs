// SPDX-License-Identifier: GPL-3.0-only
mod api;
mod config;
mod fetcher;
mod gate;
mod logging;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use api::HttpServer;
use config::Config;
use fetcher::{Fetcher, HttpClient};
use gate::{AttemptLog, FetchMediator, Policy};
use logging::setup_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_format)?;

    info!("Starting fetchgate v{}", env!("CARGO_PKG_VERSION"));

    let policy = Arc::new(Policy::from_config(&config.policy));
    info!(
        allowed_domains = ?policy.allowed_domains(),
        blocked_ports = config.policy.blocked_ports.len(),
        blocked_addresses = config.policy.blocked_addresses.len(),
        "Policy loaded"
    );

    let attempts = Arc::new(AttemptLog::new(config.attempt_log_capacity));
    info!(capacity = attempts.capacity(), "Attempt log ready");
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpClient::new(config.max_response_bytes)?);
    let mediator = Arc::new(FetchMediator::new(policy, fetcher, attempts));

    // Start HTTP server
    let http_server = HttpServer::new(mediator, config.bind);
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.serve().await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("All services started. Waiting for shutdown signal...");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    info!("Initiating graceful shutdown...");
    http_task.abort();

    info!("Shutdown complete");
    Ok(())
}
