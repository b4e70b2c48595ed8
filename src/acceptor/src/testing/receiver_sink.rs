//! In-memory receiving end for exported metrics.
//!
//! Stands in for the downstream service in tests: an HTTP endpoint that
//! accepts protobuf-encoded metrics trees and accumulates them in memory
//! for inspection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use common::model::{Metrics, ResourceMetrics};
use prost::Message;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

use crate::export::METRICS_CONTENT_TYPE;

/// Builder for [`MetricsReceiverSink`]. The endpoint is the address the
/// sink binds to and is mandatory; `build` reports an error without it.
#[derive(Debug, Default)]
pub struct MetricsReceiverSinkBuilder {
    endpoint: Option<String>,
}

impl MetricsReceiverSinkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address to bind, e.g. `127.0.0.1:0` for an ephemeral port.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn build(self) -> Result<MetricsReceiverSink, anyhow::Error> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| anyhow!("MetricsReceiverSink requires an endpoint"))?;

        Ok(MetricsReceiverSink {
            endpoint,
            received: Arc::new(Mutex::new(Vec::new())),
            server: None,
        })
    }
}

/// Accumulating metrics endpoint for tests.
///
/// Accepts `POST /v1/metrics` with a protobuf-encoded tree per request
/// and records every tree in arrival order.
pub struct MetricsReceiverSink {
    endpoint: String,
    received: Arc<Mutex<Vec<Metrics>>>,
    server: Option<SinkServer>,
}

struct SinkServer {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

#[derive(Clone)]
struct SinkState {
    received: Arc<Mutex<Vec<Metrics>>>,
}

async fn handle_metrics_post(State(state): State<SinkState>, body: Bytes) -> StatusCode {
    match Metrics::decode(body.as_ref()) {
        Ok(metrics) => {
            state.received.lock().await.push(metrics);
            StatusCode::OK
        }
        Err(e) => {
            tracing::warn!(error = ?e, "Receiver sink rejected undecodable metrics payload");
            StatusCode::BAD_REQUEST
        }
    }
}

impl MetricsReceiverSink {
    pub fn builder() -> MetricsReceiverSinkBuilder {
        MetricsReceiverSinkBuilder::new()
    }

    /// Bind the configured endpoint and start serving.
    ///
    /// Ephemeral ports are resolved here; see [`MetricsReceiverSink::local_addr`].
    pub async fn start(&mut self) -> Result<(), anyhow::Error> {
        if self.server.is_some() {
            bail!("MetricsReceiverSink already started");
        }

        let state = SinkState {
            received: self.received.clone(),
        };
        let app = Router::new()
            .route("/v1/metrics", post(handle_metrics_post))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(&self.endpoint)
            .await
            .with_context(|| format!("Failed to bind receiver sink to {}", self.endpoint))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
            {
                log::error!("Receiver sink server error: {e}");
            }
        });

        self.server = Some(SinkServer {
            local_addr,
            shutdown_tx,
            task,
        });

        Ok(())
    }

    /// Stop serving and wait for the server task to finish.
    pub async fn shutdown(&mut self) -> Result<(), anyhow::Error> {
        let server = self
            .server
            .take()
            .ok_or_else(|| anyhow!("MetricsReceiverSink not started"))?;

        let _ = server.shutdown_tx.send(());
        server
            .task
            .await
            .context("Receiver sink server task panicked")?;

        Ok(())
    }

    /// Address the sink bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(|server| server.local_addr)
    }

    /// Full URL exporters should POST to, once started.
    pub fn metrics_url(&self) -> Option<String> {
        self.local_addr()
            .map(|addr| format!("http://{addr}/v1/metrics"))
    }

    /// Total data points across every tree received so far.
    pub async fn data_point_count(&self) -> usize {
        self.received
            .lock()
            .await
            .iter()
            .map(Metrics::data_point_count)
            .sum()
    }

    /// Every tree received so far, in arrival order.
    pub async fn all_metrics(&self) -> Vec<Metrics> {
        self.received.lock().await.clone()
    }

    /// Forget everything received so far.
    pub async fn reset(&self) {
        self.received.lock().await.clear();
    }

    /// Poll until every expected resource entry has arrived, comparing by
    /// full equality. Fails once `timeout` elapses.
    pub async fn assert_all_metrics_received(
        &self,
        expected: &[ResourceMetrics],
        timeout: Duration,
    ) -> Result<(), anyhow::Error> {
        let deadline = Instant::now() + timeout;

        loop {
            let received = self.all_metrics().await;
            let flattened: Vec<&ResourceMetrics> = received
                .iter()
                .flat_map(|metrics| metrics.resource_metrics.iter())
                .collect();

            if expected.iter().all(|entry| flattened.contains(&entry)) {
                return Ok(());
            }

            if Instant::now() >= deadline {
                bail!(
                    "Timed out after {timeout:?} waiting for {} resource metrics, received {}",
                    expected.len(),
                    flattened.len()
                );
            }

            sleep(Duration::from_millis(10)).await;
        }
    }
}
