//! # Unique-Item Disambiguation
//!
//! A JSON Schema validator reports `uniqueItems` the same way whatever the
//! cause. For arrays of identified objects (releases carrying an `id`),
//! users need to know which of two situations they are in:
//!
//! - items carry identifiers but some identifier value repeats, or
//! - items lack the identifier, so uniqueness cannot be judged by id and
//!   the array simply contains duplicate elements.
//!
//! [`check`] re-inspects the array to tell these apart. Items are
//! classified one by one, so a mixed array can report both.
//!
//! Identifier uniqueness is stricter than value equality: two releases
//! with the same `id` but different content are duplicates here even
//! though a plain `uniqueItems` check passes.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::{Number, Value};

/// Outcome of checking one array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueCheck {
    /// Identifier values (joined with `", "` for compound ids) that occur
    /// more than once, sorted.
    pub duplicate_ids: Vec<String>,
    /// Some items have no usable identifier and the array holds duplicate
    /// elements.
    pub unidentified_duplicates: bool,
}

impl UniqueCheck {
    /// Returns true when nothing needs reporting.
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && !self.unidentified_duplicates
    }
}

/// Classify the items of an array. See the module docs.
pub fn check(items: &[Value], id_names: &[String]) -> UniqueCheck {
    // Canonical id key to the id as first written.
    let mut first_seen: HashMap<String, String> = HashMap::new();
    let mut duplicates: BTreeSet<String> = BTreeSet::new();
    let mut unidentified = false;

    for item in items {
        match identifier(item, id_names) {
            Some(ids) => match first_seen.entry(canonical_key(&Value::Array(ids.clone()))) {
                Entry::Occupied(first) => {
                    duplicates.insert(first.get().clone());
                }
                Entry::Vacant(slot) => {
                    slot.insert(display_ids(&ids));
                }
            },
            None => unidentified = true,
        }
    }

    UniqueCheck {
        duplicate_ids: duplicates.into_iter().collect(),
        unidentified_duplicates: unidentified && has_duplicate_elements(items),
    }
}

/// Message for a duplicate-identifier diagnostic.
pub fn duplicate_message(id_names: &[String]) -> String {
    match id_names {
        [single] => format!("Non-unique {single} values"),
        _ => format!("Non-unique combination of {} values", id_names.join(", ")),
    }
}

/// The identifier values of an object, when every id field holds a scalar.
fn identifier(item: &Value, id_names: &[String]) -> Option<Vec<Value>> {
    let obj = item.as_object()?;
    id_names
        .iter()
        .map(|name| match obj.get(name) {
            Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => Some(v.clone()),
            Some(Value::Null) | None => None,
            Some(_) => {
                tracing::warn!(id_field = %name, "ignoring non-scalar identifier value");
                None
            }
        })
        .collect()
}

fn display_ids(ids: &[Value]) -> String {
    ids.iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn has_duplicate_elements(items: &[Value]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().any(|item| !seen.insert(canonical_key(item)))
}

/// Serialization with object keys sorted and numbers compared by value,
/// so that JSON-equal values produce the same key regardless of member
/// order or number spelling (`1` and `1.0`).
fn canonical_key(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical_key(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_key).collect();
            format!("[{}]", body.join(","))
        }
        Value::Number(n) => number_key(n),
        scalar => scalar.to_string(),
    }
}

fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids() -> Vec<String> {
        vec!["id".to_string()]
    }

    fn items(v: Value) -> Vec<Value> {
        v.as_array().cloned().unwrap()
    }

    #[test]
    fn test_distinct_ids_are_clean() {
        let c = check(&items(json!([{"id": "1"}, {"id": "2"}])), &ids());
        assert!(c.is_clean());
    }

    #[test]
    fn test_duplicate_ids_with_different_content() {
        let data = items(json!([
            {"id": "EXAMPLE-1-2", "date": "2020"},
            {"id": "EXAMPLE-1-1", "tag": ["a"]},
            {"id": "EXAMPLE-1-2", "date": "2021"},
            {"id": "EXAMPLE-1-1"}
        ]));
        let c = check(&data, &ids());
        assert_eq!(c.duplicate_ids, vec!["EXAMPLE-1-1", "EXAMPLE-1-2"]);
        assert!(!c.unidentified_duplicates);
    }

    #[test]
    fn test_string_and_number_ids_differ() {
        let c = check(&items(json!([{"id": "1"}, {"id": 1}])), &ids());
        assert!(c.is_clean());
    }

    #[test]
    fn test_missing_ids_with_duplicates() {
        let c = check(&items(json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}])), &ids());
        assert!(c.duplicate_ids.is_empty());
        assert!(c.unidentified_duplicates);
    }

    #[test]
    fn test_missing_ids_but_unique() {
        let c = check(&items(json!([{"a": 1}, {"a": 2}])), &ids());
        assert!(c.is_clean());
    }

    #[test]
    fn test_mixed_array_reports_both() {
        let data = items(json!([{"id": "x"}, {"id": "x"}, {"n": 1}, {"n": 1}]));
        let c = check(&data, &ids());
        assert_eq!(c.duplicate_ids, vec!["x"]);
        assert!(c.unidentified_duplicates);
    }

    #[test]
    fn test_object_or_null_ids_are_unidentified() {
        let data = items(json!([{"id": null}, {"id": null}, {"id": {"x": 1}}]));
        let c = check(&data, &ids());
        assert!(c.duplicate_ids.is_empty());
        assert!(c.unidentified_duplicates);
    }

    #[test]
    fn test_compound_ids() {
        let names = vec!["ocid".to_string(), "id".to_string()];
        let data = items(json!([
            {"ocid": "A", "id": "1"},
            {"ocid": "A", "id": "2"},
            {"ocid": "A", "id": "1"}
        ]));
        let c = check(&data, &names);
        assert_eq!(c.duplicate_ids, vec!["A, 1"]);
        assert_eq!(duplicate_message(&names), "Non-unique combination of ocid, id values");
        assert_eq!(duplicate_message(&ids()), "Non-unique id values");
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let c = check(&items(json!([1, 1.0])), &ids());
        assert!(c.unidentified_duplicates);
        let c = check(&items(json!([{"n": 0}, {"n": -0.0}])), &ids());
        assert!(c.unidentified_duplicates);
        let c = check(&items(json!([1, 1.5])), &ids());
        assert!(c.is_clean());
    }

    #[test]
    fn test_numeric_ids_equal_by_value_reported_once() {
        let c = check(&items(json!([{"id": 7}, {"id": 7.0}, {"id": 7}])), &ids());
        assert_eq!(c.duplicate_ids, vec!["7"]);
    }

    #[test]
    fn test_scalar_items_without_ids() {
        let c = check(&items(json!(["a", "b", "a"])), &ids());
        assert!(c.unidentified_duplicates);
    }
}
