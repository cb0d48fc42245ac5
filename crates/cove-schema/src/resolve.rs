//! # Schema Registry & `$ref` Resolution
//!
//! A package schema (release or record package) rarely stands alone: it
//! refers to the release schema, which refers to its own `definitions`.
//! [`SchemaRegistry`] holds every auxiliary document the caller loaded and
//! [`SchemaResolver`] dereferences `$ref` values against it.
//!
//! ## Document Lookup
//!
//! Each document is indexed under the name it was registered with, the
//! bare filename of that name, its `$id`, and the bare filename of its
//! `$id`. A reference such as
//! `https://standard.open-contracting.org/schema/1__1__5/release-schema.json`
//! therefore finds a document registered as `release-schema.json`.
//!
//! ## Supported References
//!
//! | Form                       | Resolves to                              |
//! |----------------------------|------------------------------------------|
//! | `#/definitions/Tender`     | pointer into the referring document      |
//! | `release-schema.json`      | the whole registered document            |
//! | `release-schema.json#/x`   | pointer into the registered document     |
//!
//! Anything else fails with a [`SchemaResolutionError`]; an unresolvable
//! reference is never silently skipped.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::SchemaResolutionError;

/// Name of a package schema built without one.
pub(crate) const STANDALONE_NAME: &str = "schema.json";

/// Bound on consecutive `$ref` hops while following a validator location.
const MAX_REF_HOPS: usize = 32;

/// Auxiliary schema documents available for `$ref` resolution.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    documents: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under `name`, its filename and its `$id`.
    ///
    /// Registering a second document under an existing alias replaces the
    /// alias; the earlier document stays reachable under its other names.
    pub fn insert(&mut self, name: impl Into<String>, schema: Value) {
        let name = name.into();
        let slot = self.documents.len();

        let mut aliases = vec![name.clone(), file_name(&name).to_string()];
        if let Some(id) = schema.get("$id").or_else(|| schema.get("id")).and_then(Value::as_str) {
            let id = id.trim_end_matches('#');
            aliases.push(id.to_string());
            aliases.push(file_name(id).to_string());
        }
        for alias in aliases {
            if !alias.is_empty() {
                self.index.insert(alias, slot);
            }
        }
        self.documents.push((name, schema));
    }

    /// Look up a document by URI, `$id`, name or bare filename.
    ///
    /// Returns the name the document was registered with and the document.
    pub fn get(&self, uri: &str) -> Option<(&str, &Value)> {
        let uri = uri.trim_end_matches('#');
        let slot = self
            .index
            .get(uri)
            .or_else(|| self.index.get(file_name(uri)))?;
        self.documents
            .get(*slot)
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are registered.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|(name, _)| name.as_str())
    }
}

fn file_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// A package-level schema together with the documents it references.
#[derive(Debug, Clone)]
pub struct PackageSchema {
    name: String,
    root: Value,
    registry: SchemaRegistry,
}

impl PackageSchema {
    /// Bundle a package schema with its registry.
    pub fn new(name: impl Into<String>, root: Value, registry: SchemaRegistry) -> Self {
        Self {
            name: name.into(),
            root,
            registry,
        }
    }

    /// A schema with no external references.
    pub fn standalone(root: Value) -> Self {
        Self::new(STANDALONE_NAME, root, SchemaRegistry::new())
    }

    /// Pick the package schema `name` out of a registry of loaded documents.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaResolutionError::MissingPackageSchema`] if `name` is
    /// not registered.
    pub fn from_registry(registry: SchemaRegistry, name: &str) -> Result<Self, SchemaResolutionError> {
        let root = registry
            .get(name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| SchemaResolutionError::MissingPackageSchema {
                name: name.to_string(),
            })?;
        Ok(Self::new(name, root, registry))
    }

    /// Name of the package schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package schema document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The auxiliary documents.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// A resolver over this schema.
    pub fn resolver(&self) -> SchemaResolver<'_> {
        SchemaResolver::new(&self.name, &self.root, &self.registry)
    }
}

/// The target of a resolved `$ref`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'s> {
    /// The referenced schema node.
    pub schema: &'s Value,
    /// Document the node lives in; relative references inside it resolve
    /// against this document.
    pub document: &'s str,
    /// Stable identity of the target (`document#pointer`), used to detect
    /// re-entry while a definition is being expanded.
    pub key: String,
}

/// Dereferences `$ref` values. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'s> {
    root_name: &'s str,
    root: &'s Value,
    registry: &'s SchemaRegistry,
}

impl<'s> SchemaResolver<'s> {
    /// Resolve against `root`, addressed as `root_name`, with `registry`
    /// supplying external documents.
    pub fn new(root_name: &'s str, root: &'s Value, registry: &'s SchemaRegistry) -> Self {
        Self {
            root_name,
            root,
            registry,
        }
    }

    /// The package schema document.
    pub fn root(&self) -> &'s Value {
        self.root
    }

    /// Name of the package schema document, for use as the initial `base`.
    pub fn root_document(&self) -> &'s str {
        self.root_name
    }

    fn is_root(&self, name: &str) -> bool {
        name == self.root_name || file_name(name) == file_name(self.root_name)
    }

    /// A document by name. The package schema answers to its own name
    /// before the registry is consulted.
    fn document(&self, name: &str) -> Option<(&'s str, &'s Value)> {
        if self.is_root(name) {
            Some((self.root_name, self.root))
        } else {
            self.registry.get(name)
        }
    }

    /// Resolve `reference` as written inside the document named `base`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaResolutionError`] when the document is unknown,
    /// the pointer misses, or the fragment is not a JSON pointer.
    pub fn resolve(&self, reference: &str, base: &'s str) -> Result<Resolved<'s>, SchemaResolutionError> {
        let (document_part, fragment) = reference.split_once('#').unwrap_or((reference, ""));

        let document_part = if document_part.is_empty() {
            base
        } else {
            document_part
        };
        let (document, document_value) =
            self.document(document_part)
                .ok_or_else(|| SchemaResolutionError::UnknownDocument {
                    reference: reference.to_string(),
                    document: document_part.to_string(),
                })?;

        let schema = if fragment.is_empty() {
            document_value
        } else if fragment.starts_with('/') {
            document_value
                .pointer(fragment)
                .ok_or_else(|| SchemaResolutionError::PointerNotFound {
                    reference: reference.to_string(),
                    pointer: fragment.to_string(),
                })?
        } else {
            return Err(SchemaResolutionError::UnsupportedFragment {
                reference: reference.to_string(),
            });
        };

        Ok(Resolved {
            schema,
            document,
            key: format!("{document}#{fragment}"),
        })
    }

    /// Follow a validator's schema location (`/properties/releases/items/$ref/required`)
    /// to the schema value it names.
    ///
    /// `$ref` tokens are dereferenced. A token missing from a node that
    /// carries a `$ref` is looked up in the reference target, so locations
    /// that elide the `$ref` step also resolve. Returns `None` when the
    /// location leaves the schema.
    pub fn fragment_at(&self, schema_path: &str) -> Option<&'s Value> {
        let mut node = self.root;
        let mut document = self.root_name;
        let tokens = schema_path.strip_prefix('/').unwrap_or(schema_path);
        if tokens.is_empty() {
            return Some(node);
        }
        for raw in tokens.split('/') {
            let token = raw.replace("~1", "/").replace("~0", "~");
            if token == "$ref" {
                let target = self.follow_ref(node, document)?;
                node = target.schema;
                document = target.document;
                continue;
            }
            let mut hops = 0;
            loop {
                if let Some(next) = child(node, &token) {
                    node = next;
                    break;
                }
                hops += 1;
                if hops > MAX_REF_HOPS {
                    return None;
                }
                let target = self.follow_ref(node, document)?;
                node = target.schema;
                document = target.document;
            }
        }
        Some(node)
    }

    fn follow_ref(&self, node: &'s Value, document: &'s str) -> Option<Resolved<'s>> {
        let reference = node.get("$ref")?.as_str()?;
        self.resolve(reference, document).ok()
    }
}

fn child<'v>(node: &'v Value, token: &str) -> Option<&'v Value> {
    match node {
        Value::Object(map) => map.get(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
