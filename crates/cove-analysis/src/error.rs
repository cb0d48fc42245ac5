//! Error types for the analysis crate.

use cove_core::ConfigError;
use cove_schema::SchemaError;
use thiserror::Error;

/// An [`Analyzer`](crate::Analyzer) could not be set up or run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The schema could not be walked or compiled, or the validator failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
