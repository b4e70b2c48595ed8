//! Datapoint type and value classification

use crate::model::AggregationTemporality;
use crate::wire::{DatapointValue, MetricKind};

use super::ConvertError;

/// Output data shape a datapoint maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointShape {
    IntGauge,
    IntSum,
    Gauge,
    Sum,
}

/// Classification outcome. Temporality and monotonicity only carry meaning
/// for the sum shapes; gauges leave them at their defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointClass {
    pub shape: PointShape,
    pub temporality: AggregationTemporality,
    pub monotonic: bool,
}

impl PointClass {
    fn gauge(shape: PointShape) -> Self {
        PointClass {
            shape,
            temporality: AggregationTemporality::Unspecified,
            monotonic: false,
        }
    }

    fn monotonic_sum(shape: PointShape, temporality: AggregationTemporality) -> Self {
        PointClass {
            shape,
            temporality,
            monotonic: true,
        }
    }
}

/// Classify a datapoint by its metric kind and value kind.
///
/// The mapping is exhaustive; every combination outside it is an error:
///
/// | kind    | value  | shape    | temporality | monotonic |
/// |---------|--------|----------|-------------|-----------|
/// | Gauge   | Int    | IntGauge | -           | -         |
/// | Gauge   | Double | Gauge    | -           | -         |
/// | Count   | Int    | IntSum   | Delta       | true      |
/// | Count   | Double | Sum      | Delta       | true      |
/// | Counter | Int    | IntSum   | Cumulative  | true      |
/// | Counter | Double | Sum      | Cumulative  | true      |
///
/// Error precedence: the Timestamp kind is rejected before the value is
/// looked at, and a non-numeric or absent value is rejected before an
/// unrecognized kind.
pub fn classify(kind: MetricKind, value: &DatapointValue) -> Result<PointClass, ConvertError> {
    if kind == MetricKind::Timestamp {
        return Err(ConvertError::UnsupportedMetricKind(kind));
    }

    match value {
        DatapointValue::Int(_) => match kind {
            MetricKind::Gauge => Ok(PointClass::gauge(PointShape::IntGauge)),
            MetricKind::Count => Ok(PointClass::monotonic_sum(
                PointShape::IntSum,
                AggregationTemporality::Delta,
            )),
            MetricKind::Counter => Ok(PointClass::monotonic_sum(
                PointShape::IntSum,
                AggregationTemporality::Cumulative,
            )),
            _ => Err(ConvertError::UnsupportedMetricKind(kind)),
        },
        DatapointValue::Double(_) => match kind {
            MetricKind::Gauge => Ok(PointClass::gauge(PointShape::Gauge)),
            MetricKind::Count => Ok(PointClass::monotonic_sum(
                PointShape::Sum,
                AggregationTemporality::Delta,
            )),
            MetricKind::Counter => Ok(PointClass::monotonic_sum(
                PointShape::Sum,
                AggregationTemporality::Cumulative,
            )),
            _ => Err(ConvertError::UnsupportedMetricKind(kind)),
        },
        other => Err(ConvertError::UnsupportedValue {
            kind: other.kind_name(),
            value: other.to_string(),
        }),
    }
}
