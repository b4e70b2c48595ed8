//! Data model for converted telemetry.

pub mod metrics;

pub use metrics::{
    AggregationTemporality, DoubleDataPoint, Gauge, InstrumentationScope, IntDataPoint, IntGauge,
    IntSum, Metric, Metrics, Resource, ResourceMetrics, ScopeMetrics, Sum, metric,
};
