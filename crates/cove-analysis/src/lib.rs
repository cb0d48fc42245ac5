//! # cove-analysis: Field Statistics and Document Analysis
//!
//! Reconciles the fields found in a data document with the fields a schema
//! declares:
//!
//! - [`presence`]: how often each generic path occurs, with examples.
//! - [`deprecated`]: where fields the schema deprecates are still used.
//! - [`additional`]: fields the schema does not declare, grouped under the
//!   topmost unexpected key.
//!
//! [`Analyzer`] ties these together with schema validation from
//! `cove-schema` and produces an [`AnalysisReport`].
//!
//! All maps in the output are `BTreeMap`s, so reports are byte-for-byte
//! reproducible for the same input.

pub mod additional;
pub mod analyzer;
pub mod deprecated;
pub mod error;
pub mod presence;

pub use additional::{additional_fields, AdditionalFieldInfo, AdditionalFieldOptions};
pub use analyzer::{AnalysisReport, Analyzer};
pub use deprecated::{deprecated_fields, DeprecatedFieldReport};
pub use error::AnalysisError;
pub use presence::{
    field_stats, fields_present, fields_present_with_examples, get_fields_present, FieldPresence,
    FieldStats,
};
