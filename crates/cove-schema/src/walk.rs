//! # SchemaWalker: Declared Fields of a JSON Schema
//!
//! Walks a package schema and records, per [`GenericPath`]:
//!
//! - every field the schema declares through `properties`;
//! - the [`Deprecation`] of each field marked deprecated;
//! - every array declared `uniqueItems: true`.
//!
//! ## Traversal
//!
//! | Keyword                     | Effect                                         |
//! |-----------------------------|------------------------------------------------|
//! | `$ref`                      | resolved and walked at the same generic path   |
//! | `properties`                | each key declares `path/key`, then recurse     |
//! | `items` (schema or tuple)   | walked at the same generic path                |
//! | `oneOf` / `anyOf` / `allOf` | every branch walked; declarations are unioned  |
//!
//! ## Cycle Guard
//!
//! The walker keeps the chain of `$ref` targets currently being expanded.
//! A reference back into that chain is not expanded again, which stops
//! self-referential schemas. The chain is a stack, not a global cache: the
//! same definition reached from two sibling branches is expanded at both
//! paths, because each sits at a different generic path.
//!
//! A wrongly-shaped keyword (`properties` that is not an object, `oneOf`
//! that is not an array, `$ref` that is not a string) or an unresolvable
//! reference aborts the walk.

use std::collections::{BTreeMap, BTreeSet};

use cove_core::GenericPath;
use serde_json::Value;

use crate::deprecation::{self, Deprecation};
use crate::error::SchemaResolutionError;
use crate::resolve::{PackageSchema, SchemaRegistry, SchemaResolver, STANDALONE_NAME};

/// Composition keywords whose branches are unioned.
const COMPOSITION_KEYWORDS: [&str; 3] = ["oneOf", "anyOf", "allOf"];

/// Everything the walker learned about a schema.
///
/// Schema walking is pure, so one `SchemaFields` can serve every document
/// validated against the same schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaFields {
    /// Declared field paths.
    pub declared: BTreeSet<GenericPath>,
    /// Deprecated field paths.
    pub deprecated: BTreeMap<GenericPath, Deprecation>,
    /// Paths of arrays whose items must be unique.
    pub unique_arrays: BTreeSet<GenericPath>,
}

impl SchemaFields {
    /// Returns true if the schema declares `path`.
    pub fn declares(&self, path: &GenericPath) -> bool {
        self.declared.contains(path)
    }

    /// Declared paths rendered as `/a/b`.
    pub fn declared_strings(&self) -> BTreeSet<String> {
        self.declared.iter().map(ToString::to_string).collect()
    }
}

/// Recursive schema walker. See the module docs.
pub struct SchemaWalker<'s> {
    resolver: SchemaResolver<'s>,
    fields: SchemaFields,
    expanding: Vec<String>,
}

impl<'s> SchemaWalker<'s> {
    /// A walker over `resolver`'s root document.
    pub fn new(resolver: SchemaResolver<'s>) -> Self {
        Self {
            resolver,
            fields: SchemaFields::default(),
            expanding: Vec::new(),
        }
    }

    /// Walk the whole schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaResolutionError`] on the first unresolvable `$ref`
    /// or malformed keyword.
    pub fn walk(mut self) -> Result<SchemaFields, SchemaResolutionError> {
        let root = self.resolver.root();
        let document = self.resolver.root_document();
        self.visit(root, document, &GenericPath::root())?;
        tracing::debug!(
            declared = self.fields.declared.len(),
            deprecated = self.fields.deprecated.len(),
            unique_arrays = self.fields.unique_arrays.len(),
            "schema walk complete"
        );
        Ok(self.fields)
    }

    fn visit(&mut self, node: &'s Value, document: &'s str, path: &GenericPath) -> Result<(), SchemaResolutionError> {
        let Value::Object(obj) = node else {
            return Ok(());
        };

        if let Some(reference) = obj.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| malformed(path, "$ref", "is not a string"))?;
            let target = self.resolver.resolve(reference, document)?;
            if self.expanding.contains(&target.key) {
                tracing::trace!(reference, path = %path, "skipping re-entrant $ref");
            } else {
                self.expanding.push(target.key);
                let result = self.visit(target.schema, target.document, path);
                self.expanding.pop();
                result?;
            }
        }

        if obj.get("uniqueItems") == Some(&Value::Bool(true)) {
            self.fields.unique_arrays.insert(path.clone());
        }

        if let Some(properties) = obj.get("properties") {
            let properties = properties
                .as_object()
                .ok_or_else(|| malformed(path, "properties", "is not an object"))?;
            for (name, child) in properties {
                let child_path = path.child(name);
                self.fields.declared.insert(child_path.clone());
                if !self.fields.deprecated.contains_key(&child_path) {
                    if let Some(notice) = self.deprecation_of(child, document)? {
                        self.fields.deprecated.insert(child_path.clone(), notice);
                    }
                }
                self.visit(child, document, &child_path)?;
            }
        }

        match obj.get("items") {
            Some(items @ Value::Object(_)) => self.visit(items, document, path)?,
            Some(Value::Array(tuple)) => {
                for item in tuple {
                    self.visit(item, document, path)?;
                }
            }
            Some(Value::Bool(_)) | None => {}
            Some(_) => return Err(malformed(path, "items", "is neither a schema nor an array of schemas")),
        }

        for keyword in COMPOSITION_KEYWORDS {
            if let Some(branches) = obj.get(keyword) {
                let branches = branches
                    .as_array()
                    .ok_or_else(|| malformed(path, keyword, "is not an array"))?;
                for branch in branches {
                    self.visit(branch, document, path)?;
                }
            }
        }

        Ok(())
    }

    /// Deprecation declared on a property node, or on its `$ref` target
    /// when the property is a bare reference.
    fn deprecation_of(&self, node: &'s Value, document: &'s str) -> Result<Option<Deprecation>, SchemaResolutionError> {
        if let Some(notice) = deprecation::from_node(node) {
            return Ok(Some(notice));
        }
        match node.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                let target = self.resolver.resolve(reference, document)?;
                Ok(deprecation::from_node(target.schema))
            }
            None => Ok(None),
        }
    }
}

fn malformed(path: &GenericPath, keyword: &str, reason: &str) -> SchemaResolutionError {
    SchemaResolutionError::Malformed {
        location: if path.is_root() {
            "/".to_string()
        } else {
            path.to_string()
        },
        keyword: keyword.to_string(),
        reason: reason.to_string(),
    }
}

/// Walk a package schema.
///
/// # Errors
///
/// See [`SchemaWalker::walk`].
pub fn schema_fields(schema: &PackageSchema) -> Result<SchemaFields, SchemaResolutionError> {
    SchemaWalker::new(schema.resolver()).walk()
}

/// Declared field paths (`/a/b`) of a schema with no external references.
///
/// # Errors
///
/// See [`SchemaWalker::walk`]; any non-local `$ref` fails to resolve.
pub fn schema_dict_fields(schema: &Value) -> Result<BTreeSet<String>, SchemaResolutionError> {
    let registry = SchemaRegistry::new();
    let fields = SchemaWalker::new(SchemaResolver::new(STANDALONE_NAME, schema, &registry)).walk()?;
    Ok(fields.declared_strings())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// Nested `properties`/`items` schemas with the paths they declare.
    fn schema_with_paths() -> impl Strategy<Value = (Value, Vec<String>)> {
        let leaf = Just((json!({"type": "string"}), Vec::<String>::new()));
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::btree_map("[a-z]{1,5}", inner.clone(), 1..4).prop_map(|children| {
                    let mut properties = serde_json::Map::new();
                    let mut declared = Vec::new();
                    for (name, (schema, paths)) in children {
                        declared.push(format!("/{name}"));
                        declared.extend(paths.iter().map(|p| format!("/{name}{p}")));
                        properties.insert(name, schema);
                    }
                    (json!({"type": "object", "properties": properties}), declared)
                }),
                inner.prop_map(|(schema, paths)| (json!({"type": "array", "items": schema}), paths)),
            ]
        })
    }

    proptest! {
        /// Every path reachable through a plain properties/items chain is declared.
        #[test]
        fn declared_superset_of_direct_chains((schema, paths) in schema_with_paths()) {
            let got = schema_dict_fields(&schema).unwrap();
            for p in paths {
                prop_assert!(got.contains(&p), "missing {}", p);
            }
        }
    }
}
