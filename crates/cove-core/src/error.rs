//! # Error Types
//!
//! Errors raised while building paths or parsing configuration. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Data that does not match its schema is never an error here: malformed
//! data is what Cove exists to describe.

use thiserror::Error;

/// Error constructing or parsing a path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Generic path segments are field names and may not be empty.
    #[error("empty segment at position {position} in generic path")]
    EmptySegment {
        /// Zero-based index of the offending segment.
        position: usize,
    },

    /// The string is not an RFC 6901 JSON pointer.
    #[error("invalid JSON pointer {pointer:?}: {reason}")]
    InvalidPointer {
        /// The pointer text as received.
        pointer: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Error loading analysis configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// YAML configuration could not be parsed.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration could not be parsed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but is unusable.
    #[error("invalid configuration value for `{field}`: {reason}")]
    InvalidValue {
        /// Configuration key.
        field: &'static str,
        /// Reason the value was rejected.
        reason: String,
    },
}
