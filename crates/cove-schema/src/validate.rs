//! # Structural Validation Delegate
//!
//! Cove does not validate JSON Schema itself. It hands the document to a
//! [`StructuralValidator`] and post-processes the [`RawViolation`]s that
//! come back. The production implementation, [`JsonSchemaValidator`], is
//! backed by the `jsonschema` crate.
//!
//! ## Schema Resolution
//!
//! External `$ref`s are served from the [`SchemaRegistry`] by a local
//! retriever, so the validator never touches the network. A reference the
//! registry cannot serve fails the build: validation does not proceed
//! against a partially-resolved schema.
//!
//! ## Raw Violations
//!
//! For every error the validator reports we record the keyword that
//! failed (the last token of the schema location), the concrete path and
//! value of the offending instance, and the keyword's value in the schema
//! (e.g. the `type` list), looked up by following the schema location
//! through the resolver.

use cove_core::ConcretePath;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use crate::error::ValidationDelegateError;
use crate::resolve::{PackageSchema, SchemaRegistry};

/// One violation as reported by the structural validator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawViolation {
    /// Failing keyword, e.g. `required`, `type`, `uniqueItems`.
    pub keyword: String,
    /// Where the offending instance lives in the data.
    pub instance_path: ConcretePath,
    /// The offending instance.
    pub instance: Value,
    /// The keyword's value in the schema (`Null` when it cannot be located).
    pub validator_value: Value,
    /// JSON pointer to the keyword within the schema.
    pub schema_path: String,
    /// For `required`, the missing property.
    pub required_property: Option<String>,
    /// The validator's own description.
    pub message: String,
}

/// Anything that can check a document against a schema structurally.
pub trait StructuralValidator {
    /// Every violation in `data`, in the order the validator emits them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationDelegateError`] if the validator's output cannot
    /// be interpreted.
    fn violations(&self, data: &Value) -> Result<Vec<RawViolation>, ValidationDelegateError>;
}

/// Retriever that serves `$ref` URIs from the schema registry.
///
/// Prevents the jsonschema crate from making network requests for
/// cross-schema references.
struct LocalSchemaRetriever {
    registry: SchemaRegistry,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        match self.registry.get(uri_str) {
            Some((_, value)) => Ok(value.clone()),
            None => Err(format!("schema {uri_str} is not registered").into()),
        }
    }
}

/// [`StructuralValidator`] backed by the `jsonschema` crate.
///
/// The JSON Schema draft is taken from the schema's `$schema` keyword.
pub struct JsonSchemaValidator {
    schema: PackageSchema,
    validator: Validator,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("schema", &self.schema.name())
            .finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationDelegateError::Build`] if the schema does not
    /// compile, including when a `$ref` cannot be retrieved.
    pub fn new(schema: &PackageSchema) -> Result<Self, ValidationDelegateError> {
        let mut opts = jsonschema::options();
        opts.with_retriever(LocalSchemaRetriever {
            registry: schema.registry().clone(),
        });
        let validator = opts
            .build(schema.root())
            .map_err(|e| ValidationDelegateError::Build {
                schema_name: schema.name().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            schema: schema.clone(),
            validator,
        })
    }

    /// The schema this validator was compiled from.
    pub fn schema(&self) -> &PackageSchema {
        &self.schema
    }
}

impl StructuralValidator for JsonSchemaValidator {
    fn violations(&self, data: &Value) -> Result<Vec<RawViolation>, ValidationDelegateError> {
        let resolver = self.schema.resolver();
        let mut out = Vec::new();
        for error in self.validator.iter_errors(data) {
            let schema_path = error.schema_path.to_string();
            let keyword = last_token(&schema_path);
            let instance_path = ConcretePath::from_pointer(&error.instance_path.to_string(), data)?;
            let required_property = match &error.kind {
                ValidationErrorKind::Required { property } => Some(
                    property
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| property.to_string()),
                ),
                _ => None,
            };
            let validator_value = resolver
                .fragment_at(&schema_path)
                .cloned()
                .unwrap_or(Value::Null);
            out.push(RawViolation {
                keyword,
                instance_path,
                instance: error.instance.as_ref().clone(),
                validator_value,
                schema_path,
                required_property,
                message: error.to_string(),
            });
        }
        tracing::debug!(
            schema = self.schema.name(),
            violations = out.len(),
            "structural validation complete"
        );
        Ok(out)
    }
}

fn last_token(pointer: &str) -> String {
    pointer
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .replace("~1", "/")
        .replace("~0", "~")
}
