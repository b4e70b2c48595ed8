//! Export boundary for converted metrics.
//!
//! The handler hands every converted tree to a [`MetricsExporter`];
//! implementations own delivery from there. The production exporter
//! forwards trees as protobuf over HTTP, tests swap in a recording mock.

use anyhow::Context;
use async_trait::async_trait;
use common::config::ExporterConfig;
use common::model::Metrics;
use prost::Message;

/// Content type for exported metrics payloads
pub const METRICS_CONTENT_TYPE: &str = "application/x-protobuf";

/// Downstream destination for converted metrics trees.
#[async_trait]
pub trait MetricsExporter: Send + Sync {
    async fn export(&self, metrics: Metrics) -> Result<(), anyhow::Error>;
}

/// Exporter that POSTs protobuf-encoded metrics to an HTTP endpoint.
pub struct HttpMetricsExporter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMetricsExporter {
    pub fn new(config: &ExporterConfig) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build exporter HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl MetricsExporter for HttpMetricsExporter {
    async fn export(&self, metrics: Metrics) -> Result<(), anyhow::Error> {
        let body = metrics.encode_to_vec();

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, METRICS_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach metrics endpoint {}", self.endpoint))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Metrics endpoint {} returned status {}",
                self.endpoint,
                response.status()
            );
        }

        Ok(())
    }
}

/// Recording exporter for tests. Captures every exported tree, or fails
/// each call with a fixed message when built via [`MockMetricsExporter::failing`].
#[cfg(any(test, feature = "testing"))]
#[derive(Default)]
pub struct MockMetricsExporter {
    pub export_calls: tokio::sync::Mutex<Vec<Metrics>>,
    fail_with: Option<String>,
}

#[cfg(any(test, feature = "testing"))]
impl MockMetricsExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            export_calls: tokio::sync::Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl MetricsExporter for MockMetricsExporter {
    async fn export(&self, metrics: Metrics) -> Result<(), anyhow::Error> {
        if let Some(message) = &self.fail_with {
            anyhow::bail!("{message}");
        }

        self.export_calls.lock().await.push(metrics);
        Ok(())
    }
}
