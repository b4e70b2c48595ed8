//! Conversion from flat datapoint records to the hierarchical metrics model
//!
//! [`datapoints_to_metrics`] is the batch entry point. It never fails:
//! records that cannot be classified are logged and dropped, structurally
//! absent entries are skipped silently, and the surviving records are
//! grouped into one metrics tree. The conversion is pure apart from
//! logging; it holds no state between calls.

mod classify;
mod labels;
mod timestamp;

pub use classify::{PointClass, PointShape, classify};
pub use labels::normalize_labels;
pub use timestamp::resolve_timestamp;

use std::collections::HashMap;
use std::time::SystemTime;

use crate::model::{Gauge, IntGauge, IntSum, Metric, Metrics, Sum, metric};
use crate::wire::{Datapoint, DatapointValue, MetricKind};

/// Reasons a single datapoint cannot be converted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("unsupported metric type {0}")]
    UnsupportedMetricKind(MetricKind),
    #[error("unsupported value type {kind}: {value}")]
    UnsupportedValue { kind: &'static str, value: String },
}

/// Convert a batch of datapoint records into one metrics tree.
///
/// `time_received` is the instant the batch arrived; records without a
/// timestamp of their own resolve to it. Records sharing a metric name and
/// data shape land in one [`Metric`], in the order each (name, shape) pair
/// was first accepted. The returned tree always holds exactly one
/// ResourceMetrics/ScopeMetrics pair, even when every record was dropped.
pub fn datapoints_to_metrics(
    datapoints: &[Option<Datapoint>],
    time_received: SystemTime,
) -> Metrics {
    let mut out: Vec<Metric> = Vec::new();
    let mut index: HashMap<(String, PointShape), usize> = HashMap::new();
    let mut dropped = 0usize;

    for datapoint in datapoints {
        let Some(datapoint) = datapoint else {
            continue;
        };

        let class = match classify(datapoint.kind, &datapoint.value) {
            Ok(class) => class,
            Err(err) => {
                tracing::warn!(
                    metric = %datapoint.metric,
                    error = %err,
                    "Dropping datapoint that cannot be converted"
                );
                dropped += 1;
                continue;
            }
        };

        let time_unix_nano = resolve_timestamp(datapoint.timestamp, time_received);
        let labels = normalize_labels(&datapoint.dimensions);

        let slot = *index
            .entry((datapoint.metric.clone(), class.shape))
            .or_insert_with(|| {
                out.push(new_metric(&datapoint.metric, &class));
                out.len() - 1
            });

        // classify() pairs int shapes with int values and double shapes
        // with double values, so the remaining combinations cannot occur.
        match (&mut out[slot].data, &datapoint.value) {
            (Some(metric::Data::IntGauge(g)), DatapointValue::Int(v)) => {
                g.data_points.push(crate::model::IntDataPoint {
                    labels,
                    time_unix_nano,
                    value: *v,
                });
            }
            (Some(metric::Data::IntSum(s)), DatapointValue::Int(v)) => {
                s.data_points.push(crate::model::IntDataPoint {
                    labels,
                    time_unix_nano,
                    value: *v,
                });
            }
            (Some(metric::Data::Gauge(g)), DatapointValue::Double(v)) => {
                g.data_points.push(crate::model::DoubleDataPoint {
                    labels,
                    time_unix_nano,
                    value: *v,
                });
            }
            (Some(metric::Data::Sum(s)), DatapointValue::Double(v)) => {
                s.data_points.push(crate::model::DoubleDataPoint {
                    labels,
                    time_unix_nano,
                    value: *v,
                });
            }
            _ => {}
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "Dropped datapoints during batch conversion");
    }

    let mut metrics = Metrics::new_single_scope();
    metrics.resource_metrics[0].scope_metrics[0].metrics = out;
    metrics
}

/// Create the metric shell for a newly seen (name, shape) pair
fn new_metric(name: &str, class: &PointClass) -> Metric {
    let data = match class.shape {
        PointShape::IntGauge => metric::Data::IntGauge(IntGauge::default()),
        PointShape::IntSum => metric::Data::IntSum(IntSum {
            data_points: vec![],
            aggregation_temporality: class.temporality as i32,
            is_monotonic: class.monotonic,
        }),
        PointShape::Gauge => metric::Data::Gauge(Gauge::default()),
        PointShape::Sum => metric::Data::Sum(Sum {
            data_points: vec![],
            aggregation_temporality: class.temporality as i32,
            is_monotonic: class.monotonic,
        }),
    };

    Metric {
        name: name.to_string(),
        data: Some(data),
    }
}
