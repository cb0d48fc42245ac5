//! # PathWalker: Field Enumeration over a JSON Data Tree
//!
//! [`walk()`] yields one [`FieldOccurrence`] per object key anywhere in the
//! document, in document order, each carrying the key's [`GenericPath`],
//! its [`ConcretePath`] and a borrow of its value.
//!
//! ## Rules
//!
//! 1. The root itself produces no occurrence.
//! 2. An object contributes one occurrence per key, then recurses into the
//!    key's value.
//! 3. An array contributes nothing itself. Each element is walked with the
//!    array's generic path (all items collapse onto one `GenericPath`) and
//!    its own concrete index.
//! 4. Scalars end the recursion.
//!
//! An empty object or array is reported by its parent key and has no
//! children: present but empty, not absent.
//!
//! The walker is a plain iterator over an explicit stack. It holds no cache;
//! walking the same input again means calling [`walk()`] again.

use serde_json::map::Iter as MapIter;
use serde_json::Value;

use crate::path::{ConcretePath, GenericPath};

/// A single object key found in the data.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOccurrence<'a> {
    /// Field path with indices elided.
    pub generic: GenericPath,
    /// Field path with indices.
    pub concrete: ConcretePath,
    /// The key's value.
    pub value: &'a Value,
}

enum Frame<'a> {
    Object {
        entries: MapIter<'a>,
        generic: GenericPath,
        concrete: ConcretePath,
    },
    Array {
        items: std::iter::Enumerate<std::slice::Iter<'a, Value>>,
        generic: GenericPath,
        concrete: ConcretePath,
    },
}

impl<'a> Frame<'a> {
    fn for_value(value: &'a Value, generic: GenericPath, concrete: ConcretePath) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Frame::Object {
                entries: map.iter(),
                generic,
                concrete,
            }),
            Value::Array(items) => Some(Frame::Array {
                items: items.iter().enumerate(),
                generic,
                concrete,
            }),
            _ => None,
        }
    }
}

/// Lazy iterator over every field of a data tree. See the module docs.
pub struct PathWalker<'a> {
    stack: Vec<Frame<'a>>,
}

/// Walk `data` from the document root.
pub fn walk(data: &Value) -> PathWalker<'_> {
    walk_from(data, ConcretePath::root())
}

/// Walk `data` as if it were located at `start` within a larger document.
///
/// Generic paths are derived from `start` by dropping its indices.
pub fn walk_from(data: &Value, start: ConcretePath) -> PathWalker<'_> {
    let generic = start.to_generic();
    let stack = Frame::for_value(data, generic, start).into_iter().collect();
    PathWalker { stack }
}

impl<'a> Iterator for PathWalker<'a> {
    type Item = FieldOccurrence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame {
                Frame::Object {
                    entries,
                    generic,
                    concrete,
                } => match entries.next() {
                    Some((key, value)) => {
                        let occurrence = FieldOccurrence {
                            generic: generic.child(key),
                            concrete: concrete.key(key),
                            value,
                        };
                        if let Some(child) = Frame::for_value(
                            value,
                            occurrence.generic.clone(),
                            occurrence.concrete.clone(),
                        ) {
                            self.stack.push(child);
                        }
                        return Some(occurrence);
                    }
                    None => {
                        self.stack.pop();
                    }
                },
                Frame::Array {
                    items,
                    generic,
                    concrete,
                } => match items.next() {
                    Some((index, item)) => {
                        let child = Frame::for_value(item, generic.clone(), concrete.index(index));
                        if let Some(child) = child {
                            self.stack.push(child);
                        }
                    }
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(data: &Value) -> Vec<(String, String)> {
        walk(data)
            .map(|o| (o.generic.to_string(), o.concrete.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_object_yields_nothing() {
        assert!(pairs(&json!({})).is_empty());
        assert!(pairs(&json!([])).is_empty());
        assert!(pairs(&json!("scalar")).is_empty());
    }

    #[test]
    fn test_document_order_preorder() {
        let data = json!({"b": {"z": 1, "a": 2}, "a": 3});
        assert_eq!(
            pairs(&data),
            vec![
                ("/b".to_string(), "b".to_string()),
                ("/b/z".to_string(), "b/z".to_string()),
                ("/b/a".to_string(), "b/a".to_string()),
                ("/a".to_string(), "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_array_items_share_generic_path() {
        let data = json!({"releases": [{"id": "1"}, {"id": "2"}]});
        assert_eq!(
            pairs(&data),
            vec![
                ("/releases".to_string(), "releases".to_string()),
                ("/releases/id".to_string(), "releases/0/id".to_string()),
                ("/releases/id".to_string(), "releases/1/id".to_string()),
            ]
        );
    }

    #[test]
    fn test_root_array_of_records() {
        let data = json!([{"name": "a"}, {"name": "b", "x": []}]);
        assert_eq!(
            pairs(&data),
            vec![
                ("/name".to_string(), "0/name".to_string()),
                ("/name".to_string(), "1/name".to_string()),
                ("/x".to_string(), "1/x".to_string()),
            ]
        );
    }

    #[test]
    fn test_nested_arrays_recurse() {
        let data = json!({"grid": [[{"v": 1}], [{"v": 2}]]});
        let got = pairs(&data);
        assert_eq!(got[1], ("/grid/v".to_string(), "grid/0/0/v".to_string()));
        assert_eq!(got[2], ("/grid/v".to_string(), "grid/1/0/v".to_string()));
    }

    #[test]
    fn test_scalars_in_arrays_are_skipped() {
        let data = json!({"tags": ["a", "b"], "n": null});
        assert_eq!(pairs(&data).len(), 2);
    }

    #[test]
    fn test_walk_from_offset() {
        let inner = json!({"id": "x"});
        let start = ConcretePath::root().key("releases").index(4);
        let got: Vec<_> = walk_from(&inner, start).collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].generic.to_string(), "/releases/id");
        assert_eq!(got[0].concrete.to_string(), "releases/4/id");
        assert_eq!(got[0].value, &json!("x"));
    }

    #[test]
    fn test_values_are_borrowed() {
        let data = json!({"a": {"b": [1, 2]}});
        let occ: Vec<_> = walk(&data).collect();
        assert_eq!(occ[0].value, &json!({"b": [1, 2]}));
        assert_eq!(occ[1].value, &json!([1, 2]));
    }
}
