use std::sync::Arc;

use acceptor::export::HttpMetricsExporter;
use acceptor::serve_datapoint_http;
use anyhow::{Context, Result, anyhow};
use common::config::{CONFIG, Configuration};
use tokio::sync::oneshot;

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

    let (init_tx, init_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (stopped_tx, stopped_rx) = oneshot::channel();

    // Start the datapoint acceptor
    let server_config = config.clone();
    let server_handle = tokio::spawn(async move {
        serve_datapoint_http(&server_config, exporter, init_tx, shutdown_rx, stopped_tx)
            .await
            .expect("Failed to start datapoint http server");
    });

    // Wait for the acceptor to initialize
    let local_addr = init_rx
        .await
        .context("Failed to receive init signal from datapoint http server")?;

    log::info!("All services started successfully, accepting datapoints on {local_addr}");

    // Wait for ctrl+c
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl+c signal")?;

    // Signal the server to shut down and wait for it to stop
    let _ = shutdown_tx.send(());
    let _ = stopped_rx.await;
    let _ = server_handle.await;

    Ok(())
}
