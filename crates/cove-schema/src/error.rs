//! Schema-side error types.
//!
//! Two failure classes abort an analysis run:
//!
//! - [`SchemaResolutionError`]: a `$ref` does not resolve or a schema
//!   fragment cannot be walked. Retrying a malformed schema cannot succeed.
//! - [`ValidationDelegateError`]: the underlying JSON Schema validator
//!   refused the schema or produced output that cannot be interpreted.
//!
//! Problems with the *data* are never errors; they become diagnostics.

use cove_core::PathError;
use thiserror::Error;

/// A schema could not be resolved or walked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaResolutionError {
    /// The document part of a `$ref` names no registered schema.
    #[error("unresolvable $ref {reference:?}: no schema registered as {document:?}")]
    UnknownDocument {
        /// The `$ref` value.
        reference: String,
        /// The document part that failed lookup.
        document: String,
    },

    /// The fragment of a `$ref` points at nothing.
    #[error("unresolvable $ref {reference:?}: pointer {pointer:?} not found")]
    PointerNotFound {
        /// The `$ref` value.
        reference: String,
        /// The JSON pointer fragment.
        pointer: String,
    },

    /// Only JSON pointer fragments are supported (no plain-name anchors).
    #[error("unsupported $ref fragment in {reference:?}: expected a JSON pointer")]
    UnsupportedFragment {
        /// The `$ref` value.
        reference: String,
    },

    /// A keyword holds a value of the wrong shape.
    #[error("malformed schema at {location:?}: `{keyword}` {reason}")]
    Malformed {
        /// Generic path of the schema node holding the keyword.
        location: String,
        /// The offending keyword.
        keyword: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The package schema named by the caller is not in the registry.
    #[error("package schema {name:?} is not registered")]
    MissingPackageSchema {
        /// Requested schema name.
        name: String,
    },
}

/// The JSON Schema validator could not process the schema or data.
#[derive(Error, Debug)]
pub enum ValidationDelegateError {
    /// The validator rejected the schema at compile time.
    #[error("validator build error for schema {schema_name:?}: {reason}")]
    Build {
        /// Name of the package schema.
        schema_name: String,
        /// Validator's explanation.
        reason: String,
    },

    /// A violation's instance location could not be mapped onto the data.
    #[error("unreadable violation location: {0}")]
    Location(#[from] PathError),
}

/// Any failure of the schema crate's operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Schema resolution failed.
    #[error(transparent)]
    Resolution(#[from] SchemaResolutionError),

    /// The validator delegate failed.
    #[error(transparent)]
    Delegate(#[from] ValidationDelegateError),
}
