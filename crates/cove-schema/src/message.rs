//! Human-readable message templates for validation diagnostics.
//!
//! A [`Rendered`] message carries the text together with the
//! `message_type` used for grouping (the expected type for `type` errors,
//! the format name for `format` errors, otherwise the keyword).
//!
//! Every template depends only on the keyword, the field name and the
//! schema, never on the offending value, so that equal failures in
//! different array items share a message and group together. Where the
//! validator's own text says more (which property was unexpected, which
//! value was given) it is returned as [`Rendered::detail`].

use serde_json::Value;

/// Null clause used when a field may not be null.
pub const NOT_NULL_CLAUSE: &str = "is not null, and";

/// Message text and the category it is grouped under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Text shown to the publisher.
    pub message: String,
    /// Grouping category.
    pub message_type: String,
    /// [`NOT_NULL_CLAUSE`] for `type` errors on non-nullable fields.
    pub null_clause: String,
    /// The validator's own text, when the template is a summary of it.
    pub detail: Option<String>,
}

/// Everything a template may need about one violation.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInput<'a> {
    /// Failing keyword.
    pub keyword: &'a str,
    /// Field the violation is reported under.
    pub header: &'a str,
    /// The keyword's value in the schema.
    pub validator_value: &'a Value,
    /// The validator's own text, kept as [`Rendered::detail`] by summary
    /// templates.
    pub fallback: &'a str,
}

/// Render the message for one violation. `required` and `uniqueItems` are
/// rendered by the enricher, which has the context they need.
pub fn render(input: TemplateInput<'_>) -> Rendered {
    let TemplateInput {
        keyword,
        header,
        validator_value,
        fallback,
    } = input;

    match keyword {
        "type" => render_type(header, validator_value, fallback),
        "format" => match validator_value.as_str() {
            Some(format) => match format_message(format, header) {
                Some((kind, message)) => plain(message, kind),
                None => summary(
                    format!("'{header}' is not in the '{format}' format"),
                    keyword,
                    fallback,
                ),
            },
            None => generic(input),
        },
        "oneOf" if first_branch_is_date_time(validator_value) => {
            plain(date_time_message(), "date-time")
        }
        "oneOf" => summary(
            format!("'{header}' does not match exactly one of the allowed schemas"),
            keyword,
            fallback,
        ),
        "anyOf" => summary(
            format!("'{header}' does not match any of the allowed schemas"),
            keyword,
            fallback,
        ),
        "allOf" => summary(
            format!("'{header}' does not match all of the required schemas"),
            keyword,
            fallback,
        ),
        "not" => summary(
            format!("'{header}' matches a schema it must not match"),
            keyword,
            fallback,
        ),
        "enum" => plain(format!("Invalid code found in '{header}'"), keyword),
        "const" => summary(
            format!("'{header}' does not have the required value"),
            keyword,
            fallback,
        ),
        "additionalProperties" => summary(
            format!("'{header}' contains properties that are not allowed"),
            keyword,
            fallback,
        ),
        "pattern" => match validator_value.as_str() {
            Some(pattern) => plain(
                format!("'{header}' does not match the regex '{pattern}'"),
                keyword,
            ),
            None => generic(input),
        },
        _ => match bound_message(keyword, header, validator_value) {
            Some(message) => plain(message, keyword),
            None => generic(input),
        },
    }
}

fn plain(message: String, message_type: &str) -> Rendered {
    Rendered {
        message,
        message_type: message_type.to_string(),
        null_clause: String::new(),
        detail: None,
    }
}

fn summary(message: String, message_type: &str, fallback: &str) -> Rendered {
    Rendered {
        detail: Some(fallback.to_string()),
        ..plain(message, message_type)
    }
}

/// Any keyword without a template of its own.
fn generic(input: TemplateInput<'_>) -> Rendered {
    let TemplateInput {
        keyword,
        header,
        fallback,
        ..
    } = input;
    summary(
        format!("'{header}' fails the '{keyword}' check"),
        keyword,
        fallback,
    )
}

fn render_type(header: &str, expected: &Value, fallback: &str) -> Rendered {
    let types: Vec<&str> = match expected {
        Value::String(t) => vec![t.as_str()],
        Value::Array(ts) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    let nullable = types.contains(&"null");
    let null_clause = if nullable { "" } else { NOT_NULL_CLAUSE };
    let clause = if null_clause.is_empty() {
        String::new()
    } else {
        format!("{null_clause} ")
    };
    let non_null: Vec<&str> = types.into_iter().filter(|t| *t != "null").collect();

    let message = match non_null.as_slice() {
        [] if nullable => format!("'{header}' is not null"),
        [] => format!("'{header}' is not of the expected type"),
        ["string"] => format!(
            "'{header}' {clause}is not a string. Check that the value has quotes at the start and end. Escape any quotes in the value with '\\'"
        ),
        ["integer"] => format!(
            "'{header}' {clause}is not a integer. Check that the value doesn't contain decimal points or any characters other than 0-9. Integer values should not be in quotes."
        ),
        ["number"] => format!(
            "'{header}' {clause}is not a number. Check that the value doesn't contain any characters other than 0-9 and dot ('.'). Number values should not be in quotes."
        ),
        ["object"] => format!("'{header}' {clause}is not a JSON object"),
        ["array"] => format!("'{header}' {clause}is not a JSON array"),
        ["boolean"] => format!("'{header}' {clause}is not true or false"),
        several => format!(
            "'{header}' {clause}is not one of the allowed types: {}",
            several.join(", ")
        ),
    };
    let (message_type, detail) = match non_null.as_slice() {
        [kind @ ("string" | "integer" | "number" | "object" | "array" | "boolean")] => {
            ((*kind).to_string(), None)
        }
        _ => ("type".to_string(), Some(fallback.to_string())),
    };
    Rendered {
        message,
        message_type,
        null_clause: null_clause.to_string(),
        detail,
    }
}

fn format_message(format: &str, header: &str) -> Option<(&'static str, String)> {
    match format {
        "date-time" => Some(("date-time", date_time_message())),
        "uri" => Some(("uri", format!("'{header}' is not a uri"))),
        _ => None,
    }
}

fn date_time_message() -> String {
    "Date is not in the correct format. The correct format is YYYY-MM-DDT00:00:00Z.".to_string()
}

fn first_branch_is_date_time(branches: &Value) -> bool {
    branches
        .as_array()
        .and_then(|b| b.first())
        .and_then(|first| first.get("format"))
        .and_then(Value::as_str)
        == Some("date-time")
}

fn bound_message(keyword: &str, header: &str, bound: &Value) -> Option<String> {
    let numeric = matches!(
        keyword,
        "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf"
    );
    let n = bound.as_u64().map(|n| n.to_string()).or_else(|| {
        bound
            .as_f64()
            .filter(|_| numeric)
            .map(|f| f.to_string())
    })?;
    let message = match keyword {
        "minItems" if n == "1" => format!(
            "'{header}' is too short. You must supply at least one value, or remove the item entirely (unless it's required)."
        ),
        "minItems" => format!("'{header}' has too few items. It must contain at least {n}."),
        "maxItems" => format!("'{header}' has too many items. It must contain at most {n}."),
        "minLength" => format!("'{header}' is too short. It must be at least {n} characters long."),
        "maxLength" => format!("'{header}' is too long. It must be at most {n} characters long."),
        "minimum" => format!("'{header}' is too small. It must be at least {n}."),
        "maximum" => format!("'{header}' is too large. It must be at most {n}."),
        "minProperties" => format!("'{header}' is too short. It must have at least {n} properties."),
        "maxProperties" => format!("'{header}' has too many properties. It must have at most {n}."),
        "exclusiveMinimum" => format!("'{header}' is too small. It must be greater than {n}."),
        "exclusiveMaximum" => format!("'{header}' is too large. It must be less than {n}."),
        "multipleOf" => format!("'{header}' is not a multiple of {n}."),
        _ => return None,
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input<'a>(keyword: &'a str, header: &'a str, value: &'a Value) -> TemplateInput<'a> {
        TemplateInput {
            keyword,
            header,
            validator_value: value,
            fallback: "validator text",
        }
    }

    #[test]
    fn test_type_not_nullable() {
        let v = json!("string");
        let r = render(input("type", "id", &v));
        assert_eq!(r.message_type, "string");
        assert_eq!(r.null_clause, NOT_NULL_CLAUSE);
        assert!(r.message.starts_with("'id' is not null, and is not a string."));
    }

    #[test]
    fn test_type_nullable() {
        let v = json!(["array", "null"]);
        let r = render(input("type", "tag", &v));
        assert_eq!(r.message_type, "array");
        assert_eq!(r.null_clause, "");
        assert_eq!(r.message, "'tag' is not a JSON array");
    }

    #[test]
    fn test_type_with_several_types() {
        let v = json!(["string", "number"]);
        let r = render(input("type", "value", &v));
        assert_eq!(
            r.message,
            "'value' is not null, and is not one of the allowed types: string, number"
        );
        assert_eq!(r.message_type, "type");
        assert_eq!(r.detail.as_deref(), Some("validator text"));

        let v = json!(["string", "number", "null"]);
        let r = render(input("type", "value", &v));
        assert_eq!(r.message, "'value' is not one of the allowed types: string, number");
        assert_eq!(r.null_clause, "");
    }

    #[test]
    fn test_format_templates() {
        let v = json!("date-time");
        let r = render(input("format", "date", &v));
        assert_eq!(r.message_type, "date-time");
        assert!(r.message.starts_with("Date is not in the correct format"));

        let v = json!("uri");
        assert_eq!(render(input("format", "url", &v)).message, "'url' is not a uri");

        let v = json!("email");
        let r = render(input("format", "email", &v));
        assert_eq!(r.message_type, "format");
        assert_eq!(r.message, "'email' is not in the 'email' format");
        assert_eq!(r.detail.as_deref(), Some("validator text"));
    }

    #[test]
    fn test_one_of_date_time() {
        let v = json!([{"format": "date-time"}, {"type": "null"}]);
        assert_eq!(render(input("oneOf", "date", &v)).message_type, "date-time");
        let v = json!([{"type": "string"}]);
        assert_eq!(
            render(input("oneOf", "date", &v)).message,
            "'date' does not match exactly one of the allowed schemas"
        );
    }

    #[test]
    fn test_enum_and_pattern() {
        let v = json!(["a", "b"]);
        assert_eq!(render(input("enum", "status", &v)).message, "Invalid code found in 'status'");
        let v = json!("^[A-Z]{3}$");
        assert_eq!(
            render(input("pattern", "currency", &v)).message,
            "'currency' does not match the regex '^[A-Z]{3}$'"
        );
    }

    #[test]
    fn test_bounds() {
        let v = json!(1);
        assert!(render(input("minItems", "tag", &v)).message.contains("at least one value"));
        let v = json!(3);
        assert_eq!(
            render(input("maxLength", "id", &v)).message,
            "'id' is too long. It must be at most 3 characters long."
        );
        let v = json!(0.5);
        assert_eq!(
            render(input("minimum", "amount", &v)).message,
            "'amount' is too small. It must be at least 0.5."
        );
        let v = json!(2.5);
        assert_eq!(
            render(input("exclusiveMaximum", "rate", &v)).message,
            "'rate' is too large. It must be less than 2.5."
        );
        let v = Value::Null;
        assert_eq!(
            render(input("maxItems", "tag", &v)).message,
            "'tag' fails the 'maxItems' check"
        );
    }

    #[test]
    fn test_additional_properties_and_const() {
        let v = json!(false);
        let r = render(input("additionalProperties", "tender", &v));
        assert_eq!(r.message, "'tender' contains properties that are not allowed");
        assert_eq!(r.message_type, "additionalProperties");
        assert_eq!(r.detail.as_deref(), Some("validator text"));

        let v = json!("tender");
        let r = render(input("const", "tag", &v));
        assert_eq!(r.message, "'tag' does not have the required value");
    }

    #[test]
    fn test_unknown_keyword_uses_generic_template() {
        let v = json!({"propertyNames": {}});
        let r = render(input("dependencies", "x", &v));
        assert_eq!(r.message, "'x' fails the 'dependencies' check");
        assert_eq!(r.message_type, "dependencies");
        assert_eq!(r.detail.as_deref(), Some("validator text"));
    }

    #[test]
    fn test_templates_ignore_validator_text() {
        let v = json!(["string", "number"]);
        let a = render(TemplateInput {
            fallback: "true is not of types \"number\", \"string\"",
            ..input("type", "value", &v)
        });
        let b = render(TemplateInput {
            fallback: "false is not of types \"number\", \"string\"",
            ..input("type", "value", &v)
        });
        assert_eq!(a.message, b.message);
        assert_ne!(a.detail, b.detail);
    }

    #[test]
    fn test_plain_templates_have_no_detail() {
        let v = json!("string");
        assert_eq!(render(input("type", "id", &v)).detail, None);
        let v = json!(["a"]);
        assert_eq!(render(input("enum", "status", &v)).detail, None);
    }
}
