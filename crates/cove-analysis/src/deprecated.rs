//! Deprecated-field usage.
//!
//! Reports, per deprecated field name, the objects in the data that carry
//! the field. A report path is the concrete path of the *parent* object,
//! e.g. `releases/0` for `releases/0/initiationType`.

use std::collections::{BTreeMap, BTreeSet};

use cove_core::{walk, ConcretePath, GenericPath};
use cove_schema::{Deprecation, SchemaFields};
use serde::Serialize;
use serde_json::Value;

/// Where a deprecated field is used, and why it is deprecated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeprecatedFieldReport {
    /// Parent concrete paths, sorted.
    pub paths: Vec<String>,
    /// `(version, explanation)`.
    pub explanation: (String, String),
}

/// Deprecated fields present in `data`, keyed by field name.
///
/// Fields with the same name at different generic paths are merged into
/// one report; the explanation comes from the first such path in sorted
/// order.
pub fn deprecated_fields(data: &Value, schema: &SchemaFields) -> BTreeMap<String, DeprecatedFieldReport> {
    if schema.deprecated.is_empty() {
        return BTreeMap::new();
    }

    let mut found: BTreeMap<String, (BTreeSet<ConcretePath>, &GenericPath, &Deprecation)> = BTreeMap::new();
    for field in walk(data) {
        let Some((generic, notice)) = schema.deprecated.get_key_value(&field.generic) else {
            continue;
        };
        let Some(name) = generic.last() else {
            continue;
        };
        let parent = field.concrete.parent().unwrap_or_default();
        let entry = found
            .entry(name.to_string())
            .or_insert_with(|| (BTreeSet::new(), generic, notice));
        entry.0.insert(parent);
        if generic < entry.1 {
            entry.1 = generic;
            entry.2 = notice;
        }
    }

    found
        .into_iter()
        .map(|(name, (paths, _, notice))| {
            let report = DeprecatedFieldReport {
                paths: paths.iter().map(ToString::to_string).collect(),
                explanation: (notice.version.clone(), notice.explanation.clone()),
            };
            (name, report)
        })
        .collect()
}
