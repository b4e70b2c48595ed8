//! Internal types for decoded datapoint records
//!
//! These types represent datapoint observations after wire decoding, in the
//! form the converter consumes. They keep the states the conversion rules
//! care about explicit: an out-of-range metric kind survives as
//! [`MetricKind::Unrecognized`], a missing value as
//! [`DatapointValue::Absent`], and a never-set timestamp as `None` rather
//! than the epoch.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use prost::Message;

use super::proto;

/// A decoded datapoint observation
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    /// Metric name
    pub metric: String,
    /// When the observation was taken; `None` means the agent never set it
    pub timestamp: Option<SystemTime>,
    /// Observed value
    pub value: DatapointValue,
    /// Metric kind as reported by the agent
    pub kind: MetricKind,
    /// Dimension key/value pairs
    pub dimensions: HashMap<String, String>,
}

/// The value of a datapoint, with an explicit absent case so that "no value
/// supplied" is never conflated with a zero value.
#[derive(Debug, Clone, PartialEq)]
pub enum DatapointValue {
    Int(i64),
    Double(f64),
    Str(String),
    Absent,
}

impl DatapointValue {
    /// Short name of the value kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            DatapointValue::Int(_) => "int",
            DatapointValue::Double(_) => "double",
            DatapointValue::Str(_) => "string",
            DatapointValue::Absent => "none",
        }
    }
}

impl fmt::Display for DatapointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatapointValue::Int(v) => write!(f, "{v}"),
            DatapointValue::Double(v) => write!(f, "{v}"),
            DatapointValue::Str(v) => f.write_str(v),
            DatapointValue::Absent => f.write_str("no value set"),
        }
    }
}

/// Metric kind as an open enum: the wire transports a raw integer, and
/// values outside the known range are preserved instead of rejected at
/// decode time. The converter decides what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Count,
    Counter,
    Timestamp,
    Unrecognized(i32),
}

impl MetricKind {
    /// Map a raw wire value to a kind. Total: unknown values land in
    /// [`MetricKind::Unrecognized`].
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => MetricKind::Gauge,
            1 => MetricKind::Count,
            2 => MetricKind::Counter,
            3 => MetricKind::Timestamp,
            other => MetricKind::Unrecognized(other),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Gauge => f.write_str("gauge"),
            MetricKind::Count => f.write_str("count"),
            MetricKind::Counter => f.write_str("counter"),
            MetricKind::Timestamp => f.write_str("timestamp"),
            MetricKind::Unrecognized(raw) => write!(f, "{raw}"),
        }
    }
}

/// Decode a protobuf DatapointUpload from raw bytes.
///
/// This is the entry point for datapoint ingestion: decode the protobuf,
/// then lower every record to the internal representation. The entries are
/// all present after a wire decode; the `Option` wrapper mirrors the batch
/// converter's input contract, which tolerates structurally absent slots.
pub fn decode_datapoint_upload(data: &[u8]) -> anyhow::Result<Vec<Option<Datapoint>>> {
    let upload = proto::DatapointUpload::decode(data)
        .map_err(|e| anyhow::anyhow!("Protobuf decode failed: {e}"))?;

    Ok(upload
        .datapoints
        .into_iter()
        .map(|dp| Some(datapoint_to_internal(dp)))
        .collect())
}

/// Lower a wire datapoint to the internal representation
fn datapoint_to_internal(dp: proto::Datapoint) -> Datapoint {
    // Negative wire timestamps clamp to the epoch; the output model carries
    // unsigned nanoseconds.
    let timestamp = dp
        .timestamp_millis
        .map(|ms| UNIX_EPOCH + Duration::from_millis(ms.max(0) as u64));

    let value = match dp.value {
        Some(datum) => {
            if let Some(i) = datum.int_value {
                DatapointValue::Int(i)
            } else if let Some(d) = datum.double_value {
                DatapointValue::Double(d)
            } else if let Some(s) = datum.str_value {
                DatapointValue::Str(s)
            } else {
                DatapointValue::Absent
            }
        }
        None => DatapointValue::Absent,
    };

    Datapoint {
        metric: dp.metric,
        timestamp,
        value,
        kind: MetricKind::from_raw(dp.metric_kind),
        dimensions: dp.dimensions,
    }
}
