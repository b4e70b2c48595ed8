//! Datapoint generators for integration testing
//!
//! Builders for protobuf upload bodies in the legacy flat wire model,
//! the way a datapoint client would produce them.

use std::collections::HashMap;

use common::wire::proto::{Datapoint, DatapointUpload, Datum, MetricKind};
use prost::Message;

/// Encode a complete upload body.
pub fn encode_upload(datapoints: Vec<Datapoint>) -> Vec<u8> {
    DatapointUpload { datapoints }.encode_to_vec()
}

/// Datapoint carrying an integer value.
pub fn int_datapoint(
    metric: &str,
    kind: MetricKind,
    value: i64,
    timestamp_millis: Option<i64>,
    dimensions: &[(&str, &str)],
) -> Datapoint {
    Datapoint {
        metric: metric.to_string(),
        timestamp_millis,
        value: Some(Datum {
            int_value: Some(value),
            ..Default::default()
        }),
        metric_kind: kind as i32,
        dimensions: to_dimensions(dimensions),
    }
}

/// Datapoint carrying a floating point value.
pub fn double_datapoint(
    metric: &str,
    kind: MetricKind,
    value: f64,
    timestamp_millis: Option<i64>,
    dimensions: &[(&str, &str)],
) -> Datapoint {
    Datapoint {
        metric: metric.to_string(),
        timestamp_millis,
        value: Some(Datum {
            double_value: Some(value),
            ..Default::default()
        }),
        metric_kind: kind as i32,
        dimensions: to_dimensions(dimensions),
    }
}

/// Datapoint carrying a string value. Conversion rejects these, so they
/// exercise the drop path.
pub fn string_datapoint(metric: &str, kind: MetricKind, value: &str) -> Datapoint {
    Datapoint {
        metric: metric.to_string(),
        timestamp_millis: Some(1_700_000_000_000),
        value: Some(Datum {
            str_value: Some(value.to_string()),
            ..Default::default()
        }),
        metric_kind: kind as i32,
        dimensions: HashMap::new(),
    }
}

fn to_dimensions(dimensions: &[(&str, &str)]) -> HashMap<String, String> {
    dimensions
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
