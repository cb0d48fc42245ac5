//! # Analyzer
//!
//! Runs every analysis over a document against one package schema. The
//! schema is walked and compiled once in [`Analyzer::new`]; [`Analyzer::analyze`]
//! only reads the analyzer, so one instance can be shared across threads
//! and documents.

use std::collections::BTreeMap;

use cove_core::CoveConfig;
use cove_schema::{
    schema_fields, DiagnosticRecord, JsonSchemaValidator, PackageSchema, SchemaError, SchemaFields,
    ValidationErrorEnricher,
};
use serde::Serialize;
use serde_json::Value;

use crate::additional::{additional_fields, AdditionalFieldInfo, AdditionalFieldOptions};
use crate::deprecated::{deprecated_fields, DeprecatedFieldReport};
use crate::error::AnalysisError;
use crate::presence::get_fields_present;

/// Everything Cove found out about one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Name of the package schema the document was checked against.
    pub schema: String,
    /// Occurrences per generic path.
    pub fields_present: BTreeMap<String, usize>,
    /// Deprecated fields in use, keyed by field name.
    pub deprecated_fields: BTreeMap<String, DeprecatedFieldReport>,
    /// Undeclared fields, keyed by generic path.
    pub additional_fields: BTreeMap<String, AdditionalFieldInfo>,
    /// Number of root additional fields.
    pub additional_fields_count: usize,
    /// Grouped schema violations.
    pub validation_errors: Vec<DiagnosticRecord>,
}

/// A package schema prepared for analysing documents.
#[derive(Debug)]
pub struct Analyzer {
    config: CoveConfig,
    fields: SchemaFields,
    validator: JsonSchemaValidator,
}

impl Analyzer {
    /// Validate `config`, walk `schema` and compile its validator.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Config`] for an invalid configuration and
    /// [`AnalysisError::Schema`] if the schema cannot be walked or compiled.
    pub fn new(schema: PackageSchema, config: CoveConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let fields = schema_fields(&schema).map_err(SchemaError::from)?;
        let validator = JsonSchemaValidator::new(&schema).map_err(SchemaError::from)?;
        tracing::info!(
            schema = schema.name(),
            declared = fields.declared.len(),
            deprecated = fields.deprecated.len(),
            "analyzer ready"
        );
        Ok(Self {
            config,
            fields,
            validator,
        })
    }

    /// The schema's declared fields, deprecations and unique arrays.
    pub fn schema_fields(&self) -> &SchemaFields {
        &self.fields
    }

    /// The configuration in effect.
    pub fn config(&self) -> &CoveConfig {
        &self.config
    }

    /// Analyse one document.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Schema`] if the validator fails. Problems
    /// in the data itself are reported in the result, never as errors.
    pub fn analyze(&self, data: &Value) -> Result<AnalysisReport, AnalysisError> {
        let validation_errors = ValidationErrorEnricher::new(&self.config)
            .run(&self.validator, data, &self.fields.unique_arrays)
            .map_err(SchemaError::from)?;
        let additional_fields = additional_fields(
            data,
            &self.fields.declared,
            &AdditionalFieldOptions::from(&self.config),
        );
        let additional_fields_count = additional_fields
            .values()
            .filter(|info| info.root_additional_field)
            .count();

        let report = AnalysisReport {
            schema: self.validator.schema().name().to_string(),
            fields_present: get_fields_present(data),
            deprecated_fields: deprecated_fields(data, &self.fields),
            additional_fields,
            additional_fields_count,
            validation_errors,
        };
        tracing::debug!(
            fields = report.fields_present.len(),
            deprecated = report.deprecated_fields.len(),
            additional = report.additional_fields_count,
            validation_errors = report.validation_errors.len(),
            "document analysed"
        );
        Ok(report)
    }
}
