//! Reading data, schemas and configuration from disk.

use std::path::Path;

use anyhow::{bail, Context};
use cove_core::CoveConfig;
use cove_schema::SchemaRegistry;
use serde_json::Value;

/// Parse a JSON file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid JSON.
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON in {}", path.display()))
}

/// Register every `*.json` file directly inside `dir` under its file name.
///
/// Files are loaded in name order so that registry contents do not depend
/// on directory iteration order.
///
/// # Errors
///
/// Fails if `dir` cannot be listed, holds no JSON files, or any of them
/// fails to parse.
pub fn load_registry(dir: &Path) -> anyhow::Result<SchemaRegistry> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("listing {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        bail!("no *.json schemas found in {}", dir.display());
    }
    paths.sort();

    let mut registry = SchemaRegistry::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::warn!(path = %path.display(), "skipping schema with non-UTF-8 file name");
            continue;
        };
        let name = name.to_string();
        registry.insert(name, read_json(&path)?);
    }
    tracing::debug!(dir = %dir.display(), schemas = registry.len(), "schema registry loaded");
    Ok(registry)
}

/// Load configuration from a YAML or JSON file, or the defaults when no
/// file is given. Files ending in `.json` are parsed as JSON; anything else
/// as YAML.
///
/// # Errors
///
/// Fails if the file cannot be read, does not parse, or holds invalid
/// values.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<CoveConfig> {
    let Some(path) = path else {
        return Ok(CoveConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = if path.extension().is_some_and(|ext| ext == "json") {
        CoveConfig::from_json_str(&text)
    } else {
        CoveConfig::from_yaml_str(&text)
    }
    .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}
