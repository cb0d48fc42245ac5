//! # Analyze Subcommand
//!
//! Loads a data file, picks the package schema (explicitly, or by whether
//! the data carries records), and prints the full analysis report.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use cove_analysis::Analyzer;
use cove_core::PackageKind;
use cove_schema::PackageSchema;

use crate::load::{load_config, load_registry, read_json};
use crate::to_json;

/// Arguments for the analyze subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON data file (release or record package).
    pub data: PathBuf,

    /// Directory holding the package schema and every schema it references.
    #[arg(long)]
    pub schema_dir: PathBuf,

    /// YAML or JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Package schema file name, overriding detection.
    #[arg(long)]
    pub package_schema: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Run the subcommand and return its output.
///
/// # Errors
///
/// Fails if any input cannot be loaded or the schema cannot be compiled.
pub fn run(args: &AnalyzeArgs) -> anyhow::Result<String> {
    let config = load_config(args.config.as_deref())?;
    let data = read_json(&args.data)?;
    let registry = load_registry(&args.schema_dir)?;

    let schema_name = match &args.package_schema {
        Some(name) => name.clone(),
        None => {
            let kind = PackageKind::detect(&data, &config);
            tracing::info!(?kind, "detected package kind");
            kind.schema_name(&config).to_string()
        }
    };
    let schema = PackageSchema::from_registry(registry, &schema_name)
        .with_context(|| format!("selecting package schema in {}", args.schema_dir.display()))?;
    let analyzer = Analyzer::new(schema, config)
        .with_context(|| format!("preparing schema {schema_name}"))?;
    let report = analyzer
        .analyze(&data)
        .with_context(|| format!("analysing {}", args.data.display()))?;
    to_json(&report, args.pretty)
}
