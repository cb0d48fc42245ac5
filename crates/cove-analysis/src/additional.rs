//! # Additional Fields
//!
//! An additional field is a key found in the data whose generic path the
//! schema does not declare. Within a chain of undeclared keys only the
//! topmost one is a *root* additional field: its parent is the document
//! root or a declared field. Everything below it is listed again under the
//! root's `additional_field_descendance`, so a report can show one line per
//! unexpected subtree and expand it on demand.
//!
//! ## Language variants
//!
//! Standards that support translations let publishers add `title_fr` or
//! `description_es-MX` next to a declared `title` or `description`. With
//! [`AdditionalFieldOptions::skip_language_variants`] set, such keys are
//! not reported when their base field is declared at the same level.

use std::collections::{BTreeMap, BTreeSet};

use cove_core::{walk, CoveConfig, GenericPath};
use serde::Serialize;
use serde_json::Value;

use crate::presence::{FieldStats, DEFAULT_MAX_EXAMPLES};

/// One undeclared field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalFieldInfo {
    /// Number of occurrences in the data.
    pub count: usize,
    /// The parent is the root or a declared field.
    pub root_additional_field: bool,
    /// Parent generic path, joined with `/`.
    pub path: String,
    /// The field's own key.
    pub field_name: String,
    /// First scalar values seen.
    pub examples: Vec<Value>,
    /// Undeclared fields below this one, keyed by `/a/b`. Only populated on
    /// root additional fields.
    pub additional_field_descendance: BTreeMap<String, AdditionalFieldInfo>,
}

/// Tuning for [`additional_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditionalFieldOptions {
    /// Skip `base_xx` keys whose `base` is declared at the same level.
    pub skip_language_variants: bool,
    /// Examples kept per field.
    pub max_examples: usize,
}

impl Default for AdditionalFieldOptions {
    fn default() -> Self {
        Self {
            skip_language_variants: false,
            max_examples: DEFAULT_MAX_EXAMPLES,
        }
    }
}

impl From<&CoveConfig> for AdditionalFieldOptions {
    fn from(config: &CoveConfig) -> Self {
        Self {
            skip_language_variants: config.skip_language_variants,
            max_examples: config.max_examples,
        }
    }
}

/// Every data field absent from `declared`, keyed by `/a/b`.
pub fn additional_fields(
    data: &Value,
    declared: &BTreeSet<GenericPath>,
    options: &AdditionalFieldOptions,
) -> BTreeMap<String, AdditionalFieldInfo> {
    let mut stats: BTreeMap<GenericPath, FieldStats> = BTreeMap::new();
    for field in walk(data) {
        if declared.contains(&field.generic) {
            continue;
        }
        if options.skip_language_variants && is_declared_variant(&field.generic, declared) {
            continue;
        }
        stats
            .entry(field.generic)
            .or_default()
            .record(field.value, options.max_examples);
    }

    let is_root = |path: &GenericPath| {
        path.parent()
            .map_or(true, |parent| parent.is_root() || declared.contains(&parent))
    };

    let mut infos: BTreeMap<GenericPath, AdditionalFieldInfo> = stats
        .into_iter()
        .map(|(path, stats)| {
            let info = AdditionalFieldInfo {
                count: stats.count,
                root_additional_field: is_root(&path),
                path: path.parent().map(|p| p.joined()).unwrap_or_default(),
                field_name: path.last().unwrap_or_default().to_string(),
                examples: stats.examples,
                additional_field_descendance: BTreeMap::new(),
            };
            (path, info)
        })
        .collect();

    let descendants: Vec<(GenericPath, GenericPath)> = infos
        .iter()
        .filter(|(_, info)| !info.root_additional_field)
        .filter_map(|(path, _)| root_ancestor(path, &infos).map(|root| (root, path.clone())))
        .collect();
    for (root, path) in descendants {
        let Some(info) = infos.get(&path).cloned() else {
            continue;
        };
        if let Some(root_info) = infos.get_mut(&root) {
            root_info
                .additional_field_descendance
                .insert(path.to_string(), info);
        }
    }

    tracing::debug!(
        additional = infos.len(),
        roots = infos.values().filter(|i| i.root_additional_field).count(),
        "additional fields collected"
    );

    infos
        .into_iter()
        .map(|(path, info)| (path.to_string(), info))
        .collect()
}

/// The shallowest root additional field that is a proper prefix of `path`.
fn root_ancestor(
    path: &GenericPath,
    infos: &BTreeMap<GenericPath, AdditionalFieldInfo>,
) -> Option<GenericPath> {
    let segments = path.segments();
    (1..segments.len()).find_map(|len| {
        let prefix = segments[..len]
            .iter()
            .fold(GenericPath::root(), |p, s| p.child(s));
        infos
            .get(&prefix)
            .filter(|info| info.root_additional_field)
            .map(|_| prefix)
    })
}

fn is_declared_variant(path: &GenericPath, declared: &BTreeSet<GenericPath>) -> bool {
    let (Some(name), Some(parent)) = (path.last(), path.parent()) else {
        return false;
    };
    match language_base(name) {
        Some(base) => declared.contains(&parent.child(base)),
        None => false,
    }
}

/// `title` for `title_fr` or `title_es-MX`.
///
/// The tag is a two- or three-letter lowercase language code, optionally
/// followed by `-` and a region or script subtag of two to eight ASCII
/// alphanumerics.
fn language_base(name: &str) -> Option<&str> {
    let (base, tag) = name.rsplit_once('_')?;
    if base.is_empty() {
        return None;
    }
    let (language, region) = match tag.split_once('-') {
        Some((language, region)) => (language, Some(region)),
        None => (tag, None),
    };
    let language_ok =
        (2..=3).contains(&language.len()) && language.bytes().all(|b| b.is_ascii_lowercase());
    let region_ok = region.map_or(true, |r| {
        (2..=8).contains(&r.len()) && r.bytes().all(|b| b.is_ascii_alphanumeric())
    });
    (language_ok && region_ok).then_some(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declared(paths: &[&str]) -> BTreeSet<GenericPath> {
        paths.iter().map(|p| p.parse().unwrap()).collect()
    }

    #[test]
    fn test_additional_field_counts_and_roots() {
        let data = json!({
            "non_additional_field": "a",
            "non_additional_list": [1, 2],
            "non_additional_object": {"z": "z"},
            "additional_object": {"a": "a", "b": "b"},
            "additional_list": [
                {"c": "c", "d": "d"},
                {"e": "e", "f": "f"},
                {"e": "e", "f": "f"}
            ]
        });
        let schema = declared(&[
            "/non_additional_field",
            "/non_additional_list",
            "/non_additional_object",
            "/non_additional_object/z",
        ]);
        let info = additional_fields(&data, &schema, &AdditionalFieldOptions::default());

        assert_eq!(info.len(), 8);
        assert_eq!(info.values().map(|i| i.count).sum::<usize>(), 10);
        let roots: Vec<&str> = info
            .iter()
            .filter(|(_, i)| i.root_additional_field)
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(roots, vec!["/additional_list", "/additional_object"]);

        let list = &info["/additional_list"];
        assert_eq!(list.path, "");
        assert_eq!(list.field_name, "additional_list");
        let nested: Vec<&str> = list.additional_field_descendance.keys().map(String::as_str).collect();
        assert_eq!(
            nested,
            vec!["/additional_list/c", "/additional_list/d", "/additional_list/e", "/additional_list/f"]
        );

        let e = &info["/additional_list/e"];
        assert_eq!(e.count, 2);
        assert_eq!(e.path, "additional_list");
        assert_eq!(e.examples, vec![json!("e"), json!("e")]);
        assert!(e.additional_field_descendance.is_empty());
    }

    #[test]
    fn test_undeclared_child_of_declared_object_is_root() {
        let data = json!({"tender": {"id": "1", "extra": {"deep": 1}}});
        let schema = declared(&["/tender", "/tender/id"]);
        let info = additional_fields(&data, &schema, &AdditionalFieldOptions::default());
        assert!(info["/tender/extra"].root_additional_field);
        assert!(!info["/tender/extra/deep"].root_additional_field);
        assert!(info["/tender/extra"]
            .additional_field_descendance
            .contains_key("/tender/extra/deep"));
    }

    #[test]
    fn test_language_variants() {
        let data = json!({"title": "t", "title_fr": "f", "title_es-MX": "e", "other_fr": "o"});
        let schema = declared(&["/title"]);

        let all = additional_fields(&data, &schema, &AdditionalFieldOptions::default());
        assert_eq!(all.len(), 3);

        let options = AdditionalFieldOptions {
            skip_language_variants: true,
            ..AdditionalFieldOptions::default()
        };
        let skipped = additional_fields(&data, &schema, &options);
        let keys: Vec<&str> = skipped.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["/other_fr"]);
    }

    #[test]
    fn test_language_base() {
        assert_eq!(language_base("title_fr"), Some("title"));
        assert_eq!(language_base("name_es-MX"), Some("name"));
        assert_eq!(language_base("award_criteria_details_eng"), Some("award_criteria_details"));
        assert_eq!(language_base("title_FR"), None);
        assert_eq!(language_base("_fr"), None);
        assert_eq!(language_base("title_french"), None);
        assert_eq!(language_base("title"), None);
    }

    #[test]
    fn test_fully_declared_data() {
        let data = json!({"a": {"b": [{"c": 1}]}});
        let schema = declared(&["/a", "/a/b", "/a/b/c"]);
        assert!(additional_fields(&data, &schema, &AdditionalFieldOptions::default()).is_empty());
    }
}
