use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod aggregation;
mod config;
mod csv;
mod error;
mod middleware;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use common::HttpBroadcastSource;
use tokio::net::TcpListener;

use crate::{aggregation::Aggregator, config::Settings, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting broadcasts service");

    let settings = Settings::from_env()?;
    info!(
        "Upstream {} (batch size {}, at most {} batches per request)",
        settings.graph_url, settings.batch_size, settings.max_batches
    );

    let source = HttpBroadcastSource::new(settings.upstream())?;
    let aggregator = Aggregator::new(Arc::new(source), settings.batch_size, settings.max_batches);

    let app = routes::create_router(AppState { aggregator });

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    info!("Broadcasts service listening on {}", settings.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down broadcasts service");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
