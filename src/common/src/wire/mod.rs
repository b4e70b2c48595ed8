//! Legacy datapoint wire protocol.
//!
//! Agents report observations as flat "datapoint" records: one metric name,
//! one value, a metric-kind enum and a free-form dimension map per record.
//! The protobuf wire format lives in [`proto`]; the decoded internal
//! representation the converter works on lives in [`types`].

pub mod proto;
pub mod types;

pub use types::{Datapoint, DatapointValue, MetricKind, decode_datapoint_upload};
