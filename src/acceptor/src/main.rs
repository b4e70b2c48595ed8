use std::sync::Arc;

use acceptor::export::HttpMetricsExporter;
use acceptor::serve_datapoint_http;
use anyhow::{Context, Result, anyhow};
use common::config::{CONFIG, Configuration};
use tokio::signal;
use tokio::sync::oneshot;
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Configuration::load().context("Failed to load configuration")?;
    CONFIG
        .set(config.clone())
        .map_err(|_| anyhow!("Configuration already set"))?;

    let exporter = Arc::new(
        HttpMetricsExporter::new(&config.exporter).context("Failed to create metrics exporter")?,
    );

    // Channels for the datapoint HTTP server
    let (init_tx, init_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (stopped_tx, stopped_rx) = oneshot::channel();

    // Start the datapoint HTTP server
    let server_config = config.clone();
    let server_handle = tokio::spawn(async move {
        serve_datapoint_http(&server_config, exporter, init_tx, shutdown_rx, stopped_tx)
            .await
            .expect("Failed to start datapoint http server");
    });

    // Wait for the server to initialize
    let local_addr = init_rx
        .await
        .context("Failed to receive init signal from datapoint http server")?;
    log::info!("Datapoint acceptor ready on {local_addr}");

    // Wait for shutdown signal (Ctrl+C)
    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl+c signal")?;

    // Signal the server to shut down
    let _ = shutdown_tx.send(());

    // Wait for the server to stop
    let _ = stopped_rx.await;

    // Await the server task
    let _ = server_handle.await;

    Ok(())
}
