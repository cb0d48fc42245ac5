//! Field presence counting.
//!
//! A field's count is the number of times its key occurs anywhere in the
//! document. Keys inside array items all count towards the array's generic
//! path, so `{"a": [{"d": 1}, {"d": 1}]}` counts `/a/d` twice.

use std::collections::BTreeMap;

use cove_core::{walk, GenericPath};
use serde::Serialize;
use serde_json::Value;

/// Default number of example values kept per field.
pub const DEFAULT_MAX_EXAMPLES: usize = 3;

/// Occurrence counts keyed by generic path.
pub type FieldPresence = BTreeMap<GenericPath, usize>;

/// Count and sample values of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldStats {
    /// Number of occurrences.
    pub count: usize,
    /// The first scalar values seen, in document order.
    pub examples: Vec<Value>,
}

impl FieldStats {
    pub(crate) fn record(&mut self, value: &Value, max_examples: usize) {
        self.count += 1;
        if self.examples.len() < max_examples && is_scalar(value) {
            self.examples.push(value.clone());
        }
    }
}

/// Count every field in `data`.
pub fn fields_present(data: &Value) -> FieldPresence {
    let mut counts = FieldPresence::new();
    for field in walk(data) {
        *counts.entry(field.generic).or_default() += 1;
    }
    counts
}

/// [`fields_present`] keyed by `/a/b` strings.
pub fn get_fields_present(data: &Value) -> BTreeMap<String, usize> {
    fields_present(data)
        .into_iter()
        .map(|(path, count)| (path.to_string(), count))
        .collect()
}

/// Counts plus up to [`DEFAULT_MAX_EXAMPLES`] scalar examples per field.
pub fn fields_present_with_examples(data: &Value) -> BTreeMap<GenericPath, FieldStats> {
    field_stats(data, DEFAULT_MAX_EXAMPLES)
}

/// Counts plus up to `max_examples` scalar examples per field.
pub fn field_stats(data: &Value, max_examples: usize) -> BTreeMap<GenericPath, FieldStats> {
    let mut stats: BTreeMap<GenericPath, FieldStats> = BTreeMap::new();
    for field in walk(data) {
        stats
            .entry(field.generic)
            .or_default()
            .record(field.value, max_examples);
    }
    stats
}

/// Anything but an object or an array.
pub(crate) fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}
