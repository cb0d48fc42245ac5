//! Integration test: analyse the shared package fixtures end to end.

use cove_analysis::{deprecated_fields, get_fields_present, Analyzer};
use cove_core::{CoveConfig, PackageKind};
use cove_schema::{schema_fields, PackageSchema, SchemaRegistry};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn fixtures() -> PathBuf {
    repo_root().join("tests").join("fixtures")
}

fn data(name: &str) -> Value {
    read_json(&fixtures().join("data").join(name))
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("bad JSON in {}: {e}", path.display()))
}

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    for name in [
        "release-package-schema.json",
        "release-schema.json",
        "record-package-schema.json",
        "release_package_schema_ref_release_schema_deprecated_fields.json",
        "release_schema_deprecated_fields.json",
    ] {
        registry.insert(name, read_json(&fixtures().join("schemas").join(name)));
    }
    registry
}

fn analyzer_for(data: &Value) -> Analyzer {
    let config = CoveConfig::default();
    let name = PackageKind::detect(data, &config).schema_name(&config).to_string();
    let schema = PackageSchema::from_registry(registry(), &name).unwrap();
    Analyzer::new(schema, config).unwrap()
}

#[test]
fn test_deprecated_fields_in_releases() {
    let schema = PackageSchema::from_registry(
        registry(),
        "release_package_schema_ref_release_schema_deprecated_fields.json",
    )
    .unwrap();
    let fields = schema_fields(&schema).unwrap();
    let data = data("tenders_releases_2_releases_with_deprecated_fields.json");
    let report = deprecated_fields(&data, &fields);

    let keys: Vec<&str> = report.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["initiationType", "quantity"]);

    assert_eq!(report["initiationType"].paths, vec!["releases/0", "releases/1"]);
    assert_eq!(
        report["initiationType"].explanation,
        ("1.1".to_string(), "Not a useful field as always has to be tender".to_string())
    );
    assert_eq!(report["quantity"].paths, vec!["releases/0/tender/items/0"]);
    assert_eq!(
        report["quantity"].explanation,
        ("1.1".to_string(), "Nobody cares about quantities".to_string())
    );
}

#[test]
fn test_fields_present_in_release_package() {
    let data = data("tenders_releases_2_releases.json");
    let present = get_fields_present(&data);
    let paths: Vec<&str> = present.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "/license",
            "/publishedDate",
            "/publisher",
            "/publisher/name",
            "/publisher/scheme",
            "/publisher/uid",
            "/publisher/uri",
            "/releases",
            "/releases/buyer",
            "/releases/buyer/name",
            "/releases/date",
            "/releases/id",
            "/releases/initiationType",
            "/releases/language",
            "/releases/ocid",
            "/releases/tag",
            "/releases/tender",
            "/releases/tender/awardCriteriaDetails",
            "/releases/tender/documents",
            "/releases/tender/documents/id",
            "/releases/tender/documents/url",
            "/releases/tender/id",
            "/releases/tender/items",
            "/releases/tender/items/classification",
            "/releases/tender/items/classification/description",
            "/releases/tender/items/classification/scheme",
            "/releases/tender/items/description",
            "/releases/tender/items/id",
            "/releases/tender/methodRationale",
            "/releases/tender/procuringEntity",
            "/releases/tender/procuringEntity/name",
            "/releases/tender/procuringEntity/name_fr",
            "/releases/tender/tenderPeriod",
            "/releases/tender/tenderPeriod/endDate",
            "/uri",
            "/version",
        ]
    );
    assert_eq!(present["/releases/id"], 2);
    assert_eq!(present["/releases/tender/documents/id"], 1);
}

#[test]
fn test_full_release_report() {
    let data = data("tenders_releases_2_releases.json");
    let report = analyzer_for(&data).analyze(&data).unwrap();

    assert_eq!(report.schema, "release-package-schema.json");
    assert!(report.validation_errors.is_empty(), "{:#?}", report.validation_errors);
    assert!(report.deprecated_fields.is_empty());

    let roots: Vec<&str> = report
        .additional_fields
        .iter()
        .filter(|(_, info)| info.root_additional_field)
        .map(|(path, _)| path.as_str())
        .collect();
    assert_eq!(
        roots,
        vec![
            "/releases/tender/awardCriteriaDetails",
            "/releases/tender/documents",
            "/releases/tender/items/classification",
            "/releases/tender/methodRationale",
            "/releases/tender/procuringEntity",
        ]
    );
    assert_eq!(report.additional_fields_count, 5);

    let entity = &report.additional_fields["/releases/tender/procuringEntity"];
    assert_eq!(entity.count, 2);
    assert_eq!(entity.path, "releases/tender");
    let nested: Vec<&str> = entity
        .additional_field_descendance
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        nested,
        vec![
            "/releases/tender/procuringEntity/name",
            "/releases/tender/procuringEntity/name_fr",
        ]
    );

    let rationale = &report.additional_fields["/releases/tender/methodRationale"];
    assert_eq!(rationale.examples.len(), 2);
    assert_eq!(rationale.examples[0], Value::String("Only one supplier".to_string()));
}

#[test]
fn test_record_package_selects_record_schema() {
    let data = data("records_non_unique_no_ocid.json");
    let report = analyzer_for(&data).analyze(&data).unwrap();
    assert_eq!(report.schema, "record-package-schema.json");
    let ids: Vec<Option<&str>> = report
        .validation_errors
        .iter()
        .map(|r| r.key.error_id.as_deref())
        .collect();
    assert_eq!(ids, vec![None, Some("uniqueItems_no_ids")]);
}

#[test]
fn test_report_serializes_deterministically() {
    let data = data("releases_non_unique.json");
    let analyzer = analyzer_for(&data);
    let first = serde_json::to_string(&analyzer.analyze(&data).unwrap()).unwrap();
    let second = serde_json::to_string(&analyzer.analyze(&data).unwrap()).unwrap();
    assert_eq!(first, second);
}
