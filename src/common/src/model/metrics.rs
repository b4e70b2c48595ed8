//! Hierarchical metrics model
//!
//! Converted telemetry is organized as Resource → InstrumentationScope →
//! Metric → data points. The types are prost messages, so the in-memory
//! model doubles as the export wire format.
//!
//! A metric carries exactly one data shape. Integer and floating-point
//! observations never share a shape: an int-valued gauge becomes
//! [`IntGauge`], a float-valued one [`Gauge`], and likewise for sums. Sum
//! shapes carry their aggregation temporality and monotonicity explicitly.
//!
//! Labels are `BTreeMap`s keyed by label name, which makes label ordering
//! lexicographic and label-set equality independent of insertion order.

use std::collections::BTreeMap;

use prost::Message;

/// Top-level collection of converted metrics
#[derive(Clone, PartialEq, Message)]
pub struct Metrics {
    #[prost(message, repeated, tag = "1")]
    pub resource_metrics: Vec<ResourceMetrics>,
}

/// Metrics originating from one resource
#[derive(Clone, PartialEq, Message)]
pub struct ResourceMetrics {
    #[prost(message, optional, tag = "1")]
    pub resource: Option<Resource>,
    #[prost(message, repeated, tag = "2")]
    pub scope_metrics: Vec<ScopeMetrics>,
}

/// The entity that produced the telemetry
#[derive(Clone, PartialEq, Message)]
pub struct Resource {
    #[prost(btree_map = "string, string", tag = "1")]
    pub attributes: BTreeMap<String, String>,
}

/// Metrics produced by one instrumentation scope
#[derive(Clone, PartialEq, Message)]
pub struct ScopeMetrics {
    #[prost(message, optional, tag = "1")]
    pub scope: Option<InstrumentationScope>,
    #[prost(message, repeated, tag = "2")]
    pub metrics: Vec<Metric>,
}

#[derive(Clone, PartialEq, Message)]
pub struct InstrumentationScope {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub version: String,
}

/// A named metric with exactly one data shape
#[derive(Clone, PartialEq, Message)]
pub struct Metric {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "metric::Data", tags = "2, 3, 4, 5")]
    pub data: Option<metric::Data>,
}

pub mod metric {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag = "2")]
        IntGauge(super::IntGauge),
        #[prost(message, tag = "3")]
        IntSum(super::IntSum),
        #[prost(message, tag = "4")]
        Gauge(super::Gauge),
        #[prost(message, tag = "5")]
        Sum(super::Sum),
    }
}

/// Gauge of integer observations
#[derive(Clone, PartialEq, Message)]
pub struct IntGauge {
    #[prost(message, repeated, tag = "1")]
    pub data_points: Vec<IntDataPoint>,
}

/// Sum of integer observations
#[derive(Clone, PartialEq, Message)]
pub struct IntSum {
    #[prost(message, repeated, tag = "1")]
    pub data_points: Vec<IntDataPoint>,
    #[prost(enumeration = "AggregationTemporality", tag = "2")]
    pub aggregation_temporality: i32,
    #[prost(bool, tag = "3")]
    pub is_monotonic: bool,
}

/// Gauge of floating-point observations
#[derive(Clone, PartialEq, Message)]
pub struct Gauge {
    #[prost(message, repeated, tag = "1")]
    pub data_points: Vec<DoubleDataPoint>,
}

/// Sum of floating-point observations
#[derive(Clone, PartialEq, Message)]
pub struct Sum {
    #[prost(message, repeated, tag = "1")]
    pub data_points: Vec<DoubleDataPoint>,
    #[prost(enumeration = "AggregationTemporality", tag = "2")]
    pub aggregation_temporality: i32,
    #[prost(bool, tag = "3")]
    pub is_monotonic: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct IntDataPoint {
    #[prost(btree_map = "string, string", tag = "1")]
    pub labels: BTreeMap<String, String>,
    #[prost(fixed64, tag = "2")]
    pub time_unix_nano: u64,
    #[prost(int64, tag = "3")]
    pub value: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct DoubleDataPoint {
    #[prost(btree_map = "string, string", tag = "1")]
    pub labels: BTreeMap<String, String>,
    #[prost(fixed64, tag = "2")]
    pub time_unix_nano: u64,
    #[prost(double, tag = "3")]
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AggregationTemporality {
    Unspecified = 0,
    /// Points report the change since the previous report
    Delta = 1,
    /// Points report a running total
    Cumulative = 2,
}

impl Metrics {
    /// A tree holding one empty ResourceMetrics/ScopeMetrics pair, the shell
    /// every conversion call fills in.
    pub fn new_single_scope() -> Self {
        Metrics {
            resource_metrics: vec![ResourceMetrics {
                resource: Some(Resource::default()),
                scope_metrics: vec![ScopeMetrics {
                    scope: Some(InstrumentationScope::default()),
                    metrics: vec![],
                }],
            }],
        }
    }

    /// Total number of data points across every metric in the tree
    pub fn data_point_count(&self) -> usize {
        self.resource_metrics
            .iter()
            .flat_map(|rm| &rm.scope_metrics)
            .flat_map(|sm| &sm.metrics)
            .filter_map(|m| m.data.as_ref())
            .map(|data| match data {
                metric::Data::IntGauge(g) => g.data_points.len(),
                metric::Data::IntSum(s) => s.data_points.len(),
                metric::Data::Gauge(g) => g.data_points.len(),
                metric::Data::Sum(s) => s.data_points.len(),
            })
            .sum()
    }
}
