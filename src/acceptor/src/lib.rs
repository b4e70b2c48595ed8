//! Acceptor service for the legacy datapoint ingest protocol.
//!
//! The acceptor exposes a single HTTP endpoint, `POST /v2/datapoint`,
//! that takes protobuf-encoded datapoint uploads, converts them to the
//! hierarchical metrics model and forwards the result to a configured
//! [`MetricsExporter`](export::MetricsExporter).

pub mod export;
pub mod handler;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::post};
use common::config::Configuration;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use crate::export::MetricsExporter;
use crate::handler::datapoint_handler::{
    DatapointHandler, DatapointHandlerState, handle_datapoint_upload,
};

/// Build the acceptor router around the given exporter.
pub fn datapoint_router(exporter: Arc<dyn MetricsExporter>) -> Router {
    let state = DatapointHandlerState {
        handler: Arc::new(DatapointHandler::new(exporter)),
    };

    Router::new()
        .route("/v2/datapoint", post(handle_datapoint_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the datapoint ingest endpoint over HTTP.
///
/// Binds the configured listen address, reports the bound address over
/// `init_tx` (ports are resolved by then, so `:0` listeners learn their
/// port here), then serves until `shutdown_rx` fires. `stopped_tx`
/// signals that the server has fully drained.
pub async fn serve_datapoint_http(
    config: &Configuration,
    exporter: Arc<dyn MetricsExporter>,
    init_tx: oneshot::Sender<SocketAddr>,
    shutdown_rx: oneshot::Receiver<()>,
    stopped_tx: oneshot::Sender<()>,
) -> Result<(), anyhow::Error> {
    let addr = &config.acceptor.listen_addr;
    log::info!("Starting datapoint acceptor on {addr}");

    let app = datapoint_router(exporter);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    init_tx
        .send(local_addr)
        .map_err(|_| anyhow::anyhow!("Unable to send init signal for datapoint http server"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            log::info!("Shutting down datapoint http server");
        })
        .await?;

    stopped_tx
        .send(())
        .map_err(|_| anyhow::anyhow!("Unable to send stopped signal for datapoint http server"))?;

    Ok(())
}
