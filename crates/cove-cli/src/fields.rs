//! # Fields Subcommand
//!
//! Prints how often each field occurs in a data file.

use std::path::PathBuf;

use clap::Args;
use cove_analysis::{field_stats, get_fields_present};

use crate::load::read_json;
use crate::to_json;

/// Arguments for the fields subcommand.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// JSON data file.
    pub data: PathBuf,

    /// Include up to this many example values per field.
    #[arg(long)]
    pub examples: Option<usize>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Run the subcommand and return its output.
///
/// # Errors
///
/// Fails if the data file cannot be read.
pub fn run(args: &FieldsArgs) -> anyhow::Result<String> {
    let data = read_json(&args.data)?;
    match args.examples {
        Some(max) => to_json(&field_stats(&data, max), args.pretty),
        None => to_json(&get_fields_present(&data), args.pretty),
    }
}
