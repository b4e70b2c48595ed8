//! Datapoint Upload Handler
//!
//! Accepts the legacy flat datapoint protocol and converts each upload to
//! the hierarchical metrics model before forwarding it to the exporter.
//! Individual records that cannot be converted are dropped; the upload as
//! a whole still succeeds.
//!
//! ## Protocol Details
//!
//! - Content-Type: `application/x-protobuf`
//! - Endpoint: `POST /v2/datapoint`

use std::sync::Arc;
use std::time::SystemTime;

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use common::convert::datapoints_to_metrics;
use common::wire::decode_datapoint_upload;
use tracing;

use crate::export::MetricsExporter;

/// Content type for datapoint upload requests
pub const DATAPOINT_CONTENT_TYPE: &str = "application/x-protobuf";

/// Shared state for the datapoint handler
#[derive(Clone)]
pub struct DatapointHandlerState {
    pub handler: Arc<DatapointHandler>,
}

/// Handler for the legacy datapoint upload protocol
pub struct DatapointHandler {
    /// Destination for converted metrics trees
    exporter: Arc<dyn MetricsExporter>,
}

impl DatapointHandler {
    pub fn new(exporter: Arc<dyn MetricsExporter>) -> Self {
        Self { exporter }
    }

    /// Handle a datapoint upload request
    ///
    /// 1. Decode the protobuf upload body
    /// 2. Convert the records to a hierarchical metrics tree
    /// 3. Forward the tree to the exporter
    pub async fn handle_upload(&self, body: Bytes) -> Result<(), IngestError> {
        let time_received = SystemTime::now();

        let datapoints = decode_datapoint_upload(&body).map_err(|e| {
            tracing::error!(error = ?e, "Failed to decode datapoint upload");
            IngestError::DecodeError(e.to_string())
        })?;

        if datapoints.is_empty() {
            tracing::debug!("Empty datapoint upload, skipping");
            return Ok(());
        }

        tracing::debug!(
            datapoint_count = datapoints.len(),
            body_size = body.len(),
            "Decoded datapoint upload"
        );

        let metrics = datapoints_to_metrics(&datapoints, time_received);

        self.exporter.export(metrics).await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to export converted metrics");
            IngestError::ExportError(e.to_string())
        })?;

        Ok(())
    }
}

/// Errors that can occur during datapoint upload handling
#[derive(Debug)]
pub enum IngestError {
    DecodeError(String),
    ExportError(String),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeError(msg) => write!(f, "Decode error: {msg}"),
            Self::ExportError(msg) => write!(f, "Export error: {msg}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl IntoResponse for IngestError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            Self::DecodeError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::ExportError(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        (status, message).into_response()
    }
}

/// Axum handler for POST /v2/datapoint
///
/// Converted uploads answer 200 OK, including uploads where every record
/// was dropped during conversion. Undecodable bodies answer 400, exporter
/// failures 502.
pub async fn handle_datapoint_upload(
    State(state): State<DatapointHandlerState>,
    body: Bytes,
) -> Result<StatusCode, IngestError> {
    state.handler.handle_upload(body).await?;

    Ok(StatusCode::OK)
}
