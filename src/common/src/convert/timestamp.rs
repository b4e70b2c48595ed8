//! Datapoint timestamp resolution

use std::time::{SystemTime, UNIX_EPOCH};

/// Resolve a datapoint's timestamp to nanoseconds since the Unix epoch.
///
/// Presence decides, not the numeric value: a record that never carried a
/// timestamp falls back to the time the batch was received, while any
/// explicitly set instant is converted verbatim. An explicit epoch
/// timestamp therefore yields 0 rather than the received time. Instants
/// before the epoch saturate to 0, since the output field is unsigned.
pub fn resolve_timestamp(timestamp: Option<SystemTime>, time_received: SystemTime) -> u64 {
    let instant = timestamp.unwrap_or(time_received);
    instant
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
