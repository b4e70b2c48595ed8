//! Protobuf wire format types for the legacy datapoint upload protocol
//!
//! These prost-derived types match the datapoint protobuf specification used
//! by reporting agents. They are used for deserializing the wire format, then
//! converted to internal types.

use std::collections::HashMap;

use prost::Message;

/// DatapointUpload - the top-level message of one upload request
#[derive(Clone, PartialEq, Message)]
pub struct DatapointUpload {
    #[prost(message, repeated, tag = "1")]
    pub datapoints: Vec<Datapoint>,
}

/// A single reported observation
#[derive(Clone, PartialEq, Message)]
pub struct Datapoint {
    /// Metric name
    #[prost(string, tag = "1")]
    pub metric: String,
    /// Milliseconds since the Unix epoch. Field presence matters: an unset
    /// timestamp is not the same as an explicit 0.
    #[prost(int64, optional, tag = "2")]
    pub timestamp_millis: Option<i64>,
    /// Observed value; agents may omit it entirely
    #[prost(message, optional, tag = "3")]
    pub value: Option<Datum>,
    /// Metric kind, transported raw; out-of-range values are possible
    #[prost(enumeration = "MetricKind", tag = "4")]
    pub metric_kind: i32,
    /// Dimension key/value pairs attached to the observation
    #[prost(map = "string, string", tag = "5")]
    pub dimensions: HashMap<String, String>,
}

/// The value carried by a datapoint. Well-behaved agents set exactly one
/// field; "none set" is representable and means no value was supplied.
#[derive(Clone, PartialEq, Message)]
pub struct Datum {
    #[prost(string, optional, tag = "1")]
    pub str_value: Option<String>,
    #[prost(double, optional, tag = "2")]
    pub double_value: Option<f64>,
    #[prost(int64, optional, tag = "3")]
    pub int_value: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MetricKind {
    Gauge = 0,
    Count = 1,
    Counter = 2,
    Timestamp = 3,
}
