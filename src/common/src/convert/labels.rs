//! Dimension → label normalization

use std::collections::{BTreeMap, HashMap};

/// Copy datapoint dimensions into the label map of an output point.
///
/// Every pair is carried over verbatim, empty-string values included. The
/// `BTreeMap` output orders labels lexicographically by key, so two label
/// sets with the same pairs compare equal no matter how the source map was
/// built.
pub fn normalize_labels(dimensions: &HashMap<String, String>) -> BTreeMap<String, String> {
    dimensions
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
