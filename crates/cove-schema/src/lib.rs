//! # cove-schema: The Schema Side of Cove
//!
//! Everything Cove derives from a JSON Schema lives here:
//!
//! - **resolve**: the [`SchemaRegistry`] of auxiliary documents and the
//!   [`SchemaResolver`] that follows `$ref`s between them.
//! - **walk**: the [`SchemaWalker`], which lists declared fields,
//!   deprecations and `uniqueItems` arrays as [`SchemaFields`].
//! - **deprecation**: parsing deprecation notices out of schema nodes.
//! - **validate**: the [`StructuralValidator`] seam and its
//!   `jsonschema`-backed implementation.
//! - **enrich**: grouping raw violations into [`DiagnosticRecord`]s, with
//!   `uniqueItems` disambiguation and message templates.
//!
//! ## Crate Policy
//!
//! - Schemas arrive as `serde_json::Value`s. Reading them from disk is the
//!   CLI's job; no network access happens here.
//! - An unresolvable `$ref` is an error. Validation never proceeds against
//!   a partially-resolved schema.
//! - Problems in the data are diagnostics, never errors.

pub mod deprecation;
pub mod enrich;
pub mod error;
pub mod message;
pub mod resolve;
pub mod unique;
pub mod validate;
pub mod walk;

pub use deprecation::Deprecation;
pub use enrich::{
    validation_errors, DiagnosticKey, DiagnosticRecord, Occurrence, ValidationErrorEnricher,
};
pub use error::{SchemaError, SchemaResolutionError, ValidationDelegateError};
pub use resolve::{PackageSchema, SchemaRegistry, SchemaResolver};
pub use validate::{JsonSchemaValidator, RawViolation, StructuralValidator};
pub use walk::{schema_dict_fields, schema_fields, SchemaFields, SchemaWalker};
