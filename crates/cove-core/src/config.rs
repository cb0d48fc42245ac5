//! # Analysis Configuration
//!
//! [`CoveConfig`] carries the per-deployment knobs of an analysis run. Every
//! field has a default, so an empty YAML or JSON document is a valid
//! configuration. The defaults match the long-standing library behaviour:
//! objects in unique arrays are identified by their `id` field, and a
//! document with a top-level `records` key is a record package.
//!
//! Configuration is parsed from strings; reading the file is the caller's
//! responsibility.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// An assumption shown alongside a validation diagnostic.
///
/// Matched on the diagnostic's validator keyword and header. The text may
/// contain `{key}` placeholders filled from [`CoveConfig::context`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumptionEntry {
    /// Validator keyword, e.g. `required`.
    pub validator: String,
    /// Header the diagnostic reports, e.g. `ocid`.
    pub header: String,
    /// Assumption text.
    pub text: String,
}

/// Configuration of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveConfig {
    /// Field names that together identify an object inside a unique array.
    pub id_names: Vec<String>,
    /// Top-level key whose presence marks a record package.
    pub records_key: String,
    /// Schema name used for release packages.
    pub release_package_schema: String,
    /// Schema name used for record packages.
    pub record_package_schema: String,
    /// Ignore language-tagged variants (`title_fr`) when listing additional fields.
    pub skip_language_variants: bool,
    /// Maximum number of example values kept per field.
    pub max_examples: usize,
    /// Assumption table.
    pub assumptions: Vec<AssumptionEntry>,
    /// Deployment context substituted into assumption text.
    pub context: BTreeMap<String, String>,
}

impl Default for CoveConfig {
    fn default() -> Self {
        Self {
            id_names: vec!["id".to_string()],
            records_key: "records".to_string(),
            release_package_schema: "release-package-schema.json".to_string(),
            record_package_schema: "record-package-schema.json".to_string(),
            skip_language_variants: false,
            max_examples: 3,
            assumptions: Vec::new(),
            context: BTreeMap::new(),
        }
    }
}

impl CoveConfig {
    /// Parse and validate a YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed YAML and
    /// [`ConfigError::InvalidValue`] if a value fails validation.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes as YAML null, which serde rejects for a struct.
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed JSON and
    /// [`ConfigError::InvalidValue`] if a value fails validation.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `id_names` is empty or
    /// holds an empty name, or when `records_key` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_names.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "id_names",
                reason: "at least one identifier field is required".to_string(),
            });
        }
        if self.id_names.iter().any(String::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "id_names",
                reason: "identifier field names may not be empty".to_string(),
            });
        }
        if self.records_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "records_key",
                reason: "may not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Assumption text for a `(validator, header)` pair, with context
    /// placeholders filled in.
    pub fn assumption_for(&self, validator: &str, header: &str) -> Option<String> {
        self.assumptions
            .iter()
            .find(|a| a.validator == validator && a.header == header)
            .map(|a| render_context(&a.text, &self.context))
    }
}

/// Replace `{key}` placeholders with values from `context`. Unknown keys
/// are left untouched.
pub fn render_context(template: &str, context: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match context.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Which package schema governs a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    /// A release package (the default).
    Release,
    /// A record package: a top-level object carrying the records key.
    Record,
}

impl PackageKind {
    /// Select the package kind from the document's shape.
    pub fn detect(data: &Value, config: &CoveConfig) -> Self {
        match data {
            Value::Object(map) if map.contains_key(&config.records_key) => PackageKind::Record,
            _ => PackageKind::Release,
        }
    }

    /// The configured schema name for this package kind.
    pub fn schema_name<'c>(&self, config: &'c CoveConfig) -> &'c str {
        match self {
            PackageKind::Release => &config.release_package_schema,
            PackageKind::Record => &config.record_package_schema,
        }
    }
}
