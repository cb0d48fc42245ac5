//! # Validation Error Enrichment
//!
//! Turns the raw violation stream of a [`StructuralValidator`] into
//! grouped [`DiagnosticRecord`]s fit for showing to a data publisher.
//!
//! ## Per-violation fields
//!
//! | Field            | Source |
//! |------------------|--------|
//! | `header`         | Last key of the instance path. For `required`, the missing field. |
//! | `header_extra`   | `"<parent>/[number]"` when the instance is an array item, else `header`. |
//! | `path_no_number` | Instance path with indices dropped, joined with `/`. |
//! | `message`        | Keyword template (see [`crate::message`]). |
//! | `assumption`     | Configured text for `(validator, header)`. |
//!
//! ## Grouping
//!
//! Violations with identical [`DiagnosticKey`]s fold into one record. The
//! occurrences of a record keep the order the validator emitted them;
//! records are ordered by key, i.e. by `path_no_number` then `header`.
//!
//! ## uniqueItems
//!
//! `uniqueItems` violations are replaced by the result of re-inspecting
//! the array (see [`crate::unique`]). If the re-inspection finds nothing
//! the validator's report stands as a `uniqueItems_no_ids` record. Arrays the schema declares
//! `uniqueItems` are inspected even when the validator did not flag them,
//! since items with equal ids but different content pass a plain
//! value-equality check.

use std::collections::{BTreeMap, BTreeSet};

use cove_core::{walk, ConcretePath, CoveConfig, GenericPath, PathSegment};
use serde::Serialize;
use serde_json::Value;

use crate::error::{SchemaError, ValidationDelegateError};
use crate::message::{self, TemplateInput};
use crate::resolve::PackageSchema;
use crate::unique;
use crate::validate::{JsonSchemaValidator, RawViolation, StructuralValidator};
use crate::walk::schema_fields;

/// `error_id` of a duplicate-identifier diagnostic.
pub const UNIQUE_WITH_ID: &str = "uniqueItems_with_id";
/// `error_id` of a diagnostic about duplicate unidentified items.
pub const UNIQUE_NO_IDS: &str = "uniqueItems_no_ids";

const UNIQUE_NO_IDS_MESSAGE: &str = "Array has non-unique elements";

/// Everything that identifies a diagnostic group.
///
/// Field order is the output sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DiagnosticKey {
    /// Instance path with indices dropped (`releases/tender/items`).
    pub path_no_number: String,
    /// Field the diagnostic is about.
    pub header: String,
    /// Rendered message. Never contains the offending value.
    pub message: String,
    /// Grouping category, see [`crate::message`].
    pub message_type: String,
    /// Failing keyword.
    pub validator: String,
    /// Configured explanation for `(validator, header)`.
    pub assumption: Option<String>,
    /// `header`, or `"<parent>/[number]"` for array items.
    pub header_extra: String,
    /// Null clause of `type` messages.
    pub null_clause: String,
    /// Set for the `uniqueItems` variants.
    pub error_id: Option<String>,
}

/// One place in the data where a diagnostic applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    /// Location in the data.
    pub path: ConcretePath,
    /// The offending value, for scalars and duplicate ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// The validator's own description, where the message summarises it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Occurrence {
    fn at(path: ConcretePath) -> Self {
        Self {
            path,
            value: None,
            detail: None,
        }
    }
}

/// A group of violations sharing a [`DiagnosticKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    #[serde(flatten)]
    pub key: DiagnosticKey,
    #[serde(rename = "values")]
    pub occurrences: Vec<Occurrence>,
}

/// Converts raw violations into diagnostic records.
#[derive(Debug, Clone, Copy)]
pub struct ValidationErrorEnricher<'c> {
    config: &'c CoveConfig,
}

impl<'c> ValidationErrorEnricher<'c> {
    /// An enricher reading ids, assumptions and context from `config`.
    pub fn new(config: &'c CoveConfig) -> Self {
        Self { config }
    }

    /// Validate `data` with `validator` and enrich the result.
    ///
    /// # Errors
    ///
    /// Propagates any [`ValidationDelegateError`] from the validator.
    pub fn run<V: StructuralValidator + ?Sized>(
        &self,
        validator: &V,
        data: &Value,
        unique_arrays: &BTreeSet<GenericPath>,
    ) -> Result<Vec<DiagnosticRecord>, ValidationDelegateError> {
        let raw = validator.violations(data)?;
        Ok(self.enrich(data, raw, unique_arrays))
    }

    /// Group `raw` into diagnostic records. See the module docs.
    pub fn enrich(
        &self,
        data: &Value,
        raw: Vec<RawViolation>,
        unique_arrays: &BTreeSet<GenericPath>,
    ) -> Vec<DiagnosticRecord> {
        let raw_count = raw.len();
        let mut groups = Groups::default();
        let mut inspected: BTreeSet<ConcretePath> = BTreeSet::new();

        for violation in raw {
            if violation.keyword == "uniqueItems" {
                if inspected.insert(violation.instance_path.clone()) {
                    self.unique_items(
                        &violation.instance_path,
                        &violation.instance,
                        Some(&violation.message),
                        &mut groups,
                    );
                }
                continue;
            }
            let (key, occurrence) = self.diagnostic(violation);
            groups.push(key, occurrence);
        }

        if !unique_arrays.is_empty() {
            for field in walk(data) {
                if field.value.is_array()
                    && unique_arrays.contains(&field.generic)
                    && inspected.insert(field.concrete.clone())
                {
                    self.unique_items(&field.concrete, field.value, None, &mut groups);
                }
            }
        }

        let records = groups.into_records();
        tracing::debug!(
            violations = raw_count,
            records = records.len(),
            "validation errors enriched"
        );
        records
    }

    fn diagnostic(&self, violation: RawViolation) -> (DiagnosticKey, Occurrence) {
        let RawViolation {
            keyword,
            instance_path,
            instance,
            validator_value,
            required_property,
            message: fallback,
            ..
        } = violation;

        let (mut header, array_extra) = headers(&instance_path);
        let rendered = match (keyword.as_str(), required_property) {
            ("required", Some(field)) => {
                let message = if instance_path.len() > 2 {
                    let parent = instance_path.last_key().unwrap_or_default();
                    format!("'{field}' is missing but required within '{parent}'")
                } else {
                    format!("'{field}' is missing but required")
                };
                header = field;
                message::Rendered {
                    message,
                    message_type: keyword.clone(),
                    null_clause: String::new(),
                    detail: None,
                }
            }
            _ => message::render(TemplateInput {
                keyword: &keyword,
                header: &header,
                validator_value: &validator_value,
                fallback: &fallback,
            }),
        };

        let value = match instance {
            Value::Object(_) | Value::Array(_) => None,
            scalar => Some(scalar),
        };
        let key = DiagnosticKey {
            path_no_number: instance_path.to_generic().joined(),
            assumption: self.config.assumption_for(&keyword, &header),
            header_extra: array_extra.unwrap_or_else(|| header.clone()),
            header,
            message: rendered.message,
            message_type: rendered.message_type,
            validator: keyword,
            null_clause: rendered.null_clause,
            error_id: None,
        };
        let occurrence = Occurrence {
            path: instance_path,
            value,
            detail: rendered.detail,
        };
        (key, occurrence)
    }

    /// Re-inspect an array. `reported` is the validator's text when the
    /// validator flagged the array itself.
    fn unique_items(
        &self,
        path: &ConcretePath,
        instance: &Value,
        reported: Option<&str>,
        groups: &mut Groups,
    ) {
        let Some(items) = instance.as_array() else {
            tracing::warn!(path = %path, "uniqueItems reported on a non-array instance");
            return;
        };
        let mut outcome = unique::check(items, &self.config.id_names);
        let mut detail = None;
        if outcome.is_clean() {
            let Some(reported) = reported else {
                return;
            };
            tracing::warn!(path = %path, "validator reported duplicates the re-inspection missed");
            outcome.unidentified_duplicates = true;
            detail = Some(reported.to_string());
        }

        let (header, array_extra) = headers(path);
        let base = DiagnosticKey {
            path_no_number: path.to_generic().joined(),
            assumption: self.config.assumption_for("uniqueItems", &header),
            header_extra: array_extra.unwrap_or_else(|| header.clone()),
            header,
            message: String::new(),
            message_type: "uniqueItems".to_string(),
            validator: "uniqueItems".to_string(),
            null_clause: String::new(),
            error_id: None,
        };

        if !outcome.duplicate_ids.is_empty() {
            let key = DiagnosticKey {
                message: unique::duplicate_message(&self.config.id_names),
                error_id: Some(UNIQUE_WITH_ID.to_string()),
                ..base.clone()
            };
            for id in outcome.duplicate_ids {
                groups.push(
                    key.clone(),
                    Occurrence {
                        value: Some(Value::String(id)),
                        ..Occurrence::at(path.clone())
                    },
                );
            }
        }
        if outcome.unidentified_duplicates {
            let key = DiagnosticKey {
                message: UNIQUE_NO_IDS_MESSAGE.to_string(),
                error_id: Some(UNIQUE_NO_IDS.to_string()),
                ..base
            };
            groups.push(
                key,
                Occurrence {
                    detail,
                    ..Occurrence::at(path.clone())
                },
            );
        }
    }
}

/// `(header, header_extra)` for an instance path. `header_extra` is only
/// returned when the instance is an array item.
fn headers(path: &ConcretePath) -> (String, Option<String>) {
    let header = path.last_key().unwrap_or_default().to_string();
    match path.last() {
        Some(PathSegment::Index(_)) => {
            let extra = format!("{header}/[number]");
            (header, Some(extra))
        }
        _ => (header, None),
    }
}

#[derive(Default)]
struct Groups(BTreeMap<DiagnosticKey, Vec<Occurrence>>);

impl Groups {
    fn push(&mut self, key: DiagnosticKey, occurrence: Occurrence) {
        self.0.entry(key).or_default().push(occurrence);
    }

    fn into_records(self) -> Vec<DiagnosticRecord> {
        self.0
            .into_iter()
            .map(|(key, occurrences)| DiagnosticRecord { key, occurrences })
            .collect()
    }
}

/// Validate `data` against `schema` and return enriched diagnostics.
///
/// Walks and compiles the schema on every call; use
/// [`ValidationErrorEnricher::run`] with a cached validator to analyse
/// many documents.
///
/// # Errors
///
/// Returns [`SchemaError`] if the schema cannot be walked or compiled.
pub fn validation_errors(
    data: &Value,
    schema: &PackageSchema,
    config: &CoveConfig,
) -> Result<Vec<DiagnosticRecord>, SchemaError> {
    let fields = schema_fields(schema)?;
    let validator = JsonSchemaValidator::new(schema)?;
    let records = ValidationErrorEnricher::new(config).run(&validator, data, &fields.unique_arrays)?;
    Ok(records)
}
