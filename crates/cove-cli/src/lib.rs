//! # cove-cli: Cove Command-Line Interface
//!
//! ## Subcommands
//!
//! - `analyze`: full report (validation errors, field presence, deprecated
//!   and additional fields) for a data file against a schema directory.
//! - `fields`: field presence counts for a data file, no schema needed.
//!
//! ## Crate Policy
//!
//! - This is the only crate that reads files. The library crates receive
//!   parsed `serde_json::Value`s and configuration structs.
//! - Handlers return the text to print; `main` owns stdout.
//! - Errors are `anyhow` with context naming the file involved.

pub mod analyze;
pub mod fields;
pub mod load;

/// Serialize `value` as compact or pretty JSON.
///
/// # Errors
///
/// Fails only if `value` cannot be represented as JSON.
pub fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
