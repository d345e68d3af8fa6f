//! Recursive structural validation of JSON values against a constraint tree
//!
//! Validation is pure and never fails early: the full list of violations
//! is accumulated so a caller can fix every problem in one round-trip.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use super::constraint::{SchemaNode, value_kind};

/// A single structural violation at a dotted path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path into the value, e.g. `properties.ticker` or `properties.tags[2]`
    pub path: String,
    /// Full human-readable message, path included
    pub message: String,
}

impl Violation {
    fn new(path: &str, message: String) -> Self {
        Self {
            path: path.to_string(),
            message,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validate a properties object against a parsed schema, rooted at the
/// conventional `properties` path.
pub fn validate_properties(value: &Value, schema: &SchemaNode) -> Vec<Violation> {
    validate_at(value, schema, "properties")
}

/// Validate `value` against `schema` at the given path.
///
/// Returns all violations found; an empty list means the value conforms.
pub fn validate_at(value: &Value, schema: &SchemaNode, path: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    // Type mismatch stops descent into this subtree: the remaining
    // constraints would only produce noise against the wrong kind.
    if let Some(types) = &schema.types {
        if !types.iter().any(|t| t.matches(value)) {
            let expected = types
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" or ");
            violations.push(Violation::new(
                path,
                format!("{} expected {}, got {} ({})", path, expected, value_kind(value), value),
            ));
            return violations;
        }
    }

    if let Some(allowed) = &schema.enum_values {
        if !allowed.contains(value) {
            let listed = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            violations.push(Violation::new(
                path,
                format!("{} must be one of [{}], got {}", path, listed, value),
            ));
        }
    }

    match value {
        Value::Number(_) => check_number(value, schema, path, &mut violations),
        Value::String(s) => check_string(s, schema, path, &mut violations),
        Value::Array(items) => check_array(items, schema, path, &mut violations),
        Value::Object(map) => check_object(map, schema, path, &mut violations),
        _ => {}
    }

    violations
}

fn check_number(value: &Value, schema: &SchemaNode, path: &str, out: &mut Vec<Violation>) {
    let Some(n) = value.as_f64() else { return };

    if let Some(min) = schema.number.minimum {
        if n < min {
            out.push(Violation::new(
                path,
                format!("{} must be >= {}, got {}", path, min, n),
            ));
        }
    }
    if let Some(max) = schema.number.maximum {
        if n > max {
            out.push(Violation::new(
                path,
                format!("{} must be <= {}, got {}", path, max, n),
            ));
        }
    }
}

fn check_string(s: &str, schema: &SchemaNode, path: &str, out: &mut Vec<Violation>) {
    let len = s.chars().count();

    if let Some(min) = schema.string.min_length {
        if len < min {
            out.push(Violation::new(
                path,
                format!("{} must be at least {} characters, got {}", path, min, len),
            ));
        }
    }
    if let Some(max) = schema.string.max_length {
        if len > max {
            out.push(Violation::new(
                path,
                format!("{} must be at most {} characters, got {}", path, max, len),
            ));
        }
    }

    if let Some(pattern) = &schema.string.pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(s) {
                    out.push(Violation::new(
                        path,
                        format!("{} does not match pattern {}", path, pattern),
                    ));
                }
            }
            Err(_) => {
                out.push(Violation::new(
                    path,
                    format!("{} has an invalid pattern {}", path, pattern),
                ));
            }
        }
    }

    if schema.string.format.as_deref() == Some("date-time") && !parses_as_date_time(s) {
        out.push(Violation::new(
            path,
            format!("{} is not a valid date-time (\"{}\")", path, s),
        ));
    }
}

/// Accept RFC 3339, a space-separated datetime, or a bare date.
/// Anything else, including human-formatted numbers, is rejected.
fn parses_as_date_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn check_array(items: &[Value], schema: &SchemaNode, path: &str, out: &mut Vec<Violation>) {
    if let Some(min) = schema.array.min_items {
        if items.len() < min {
            out.push(Violation::new(
                path,
                format!("{} must have at least {} items, got {}", path, min, items.len()),
            ));
        }
    }
    if let Some(max) = schema.array.max_items {
        if items.len() > max {
            out.push(Violation::new(
                path,
                format!("{} must have at most {} items, got {}", path, max, items.len()),
            ));
        }
    }

    if let Some(item_schema) = &schema.array.items {
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", path, i);
            out.extend(validate_at(item, item_schema, &item_path));
        }
    }
}

fn check_object(
    map: &serde_json::Map<String, Value>,
    schema: &SchemaNode,
    path: &str,
    out: &mut Vec<Violation>,
) {
    for key in &schema.object.required {
        if !map.contains_key(key) {
            out.push(Violation::new(
                path,
                format!("{}.{} is required", path, key),
            ));
        }
    }

    for (key, prop_schema) in &schema.object.properties {
        if let Some(prop_value) = map.get(key) {
            let prop_path = format!("{}.{}", path, key);
            out.extend(validate_at(prop_value, prop_schema, &prop_path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: &Value, schema: &Value) -> Vec<Violation> {
        validate_properties(value, &SchemaNode::parse(schema))
    }

    #[test]
    fn test_missing_required_field() {
        let schema = json!({
            "type": "object",
            "required": ["ticker"],
            "properties": { "ticker": { "type": "string" } }
        });
        let violations = validate(&json!({}), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("properties.ticker is required"));
    }

    #[test]
    fn test_stringified_number_rejected() {
        let schema = json!({
            "type": "object",
            "properties": { "price": { "type": "number" } }
        });
        let violations = validate(&json!({ "price": "$171.88" }), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("expected number"));
        assert!(violations[0].message.contains("got string"));
        assert!(violations[0].message.contains("$171.88"));
    }

    #[test]
    fn test_type_mismatch_stops_descent() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        // Wrong kind at the root produces exactly one violation, not a
        // cascade of required/property failures underneath.
        let violations = validate(&json!([1, 2]), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("expected object"));
    }

    #[test]
    fn test_all_violations_reported() {
        let schema = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "number" },
                "c": { "type": "string", "minLength": 3 }
            }
        });
        let violations = validate(&json!({ "c": "xy" }), &schema);
        // Missing a, missing b, c too short.
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_enum_violation_lists_allowed_values() {
        let schema = json!({ "enum": ["bull", "bear"] });
        let violations = validate(&json!("sideways"), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("bull"));
        assert!(violations[0].message.contains("bear"));
    }

    #[test]
    fn test_numeric_bounds_inclusive() {
        let schema = json!({ "type": "number", "minimum": 0, "maximum": 1 });
        assert!(validate(&json!(0), &schema).is_empty());
        assert!(validate(&json!(1), &schema).is_empty());
        assert!(validate(&json!(0.5), &schema).is_empty());
        assert_eq!(validate(&json!(1.01), &schema).len(), 1);
        assert_eq!(validate(&json!(-0.01), &schema).len(), 1);
    }

    #[test]
    fn test_integer_rejects_fractional() {
        let schema = json!({ "type": "integer" });
        assert!(validate(&json!(42), &schema).is_empty());
        assert!(validate(&json!(42.0), &schema).is_empty());
        assert_eq!(validate(&json!(42.5), &schema).len(), 1);
    }

    #[test]
    fn test_pattern() {
        let schema = json!({ "type": "string", "pattern": "^[A-Z]{1,5}$" });
        assert!(validate(&json!("ACME"), &schema).is_empty());
        let violations = validate(&json!("acme"), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("does not match pattern"));
    }

    #[test]
    fn test_date_time_format() {
        let schema = json!({ "type": "string", "format": "date-time" });
        assert!(validate(&json!("2026-08-30T12:00:00Z"), &schema).is_empty());
        assert!(validate(&json!("2026-08-30 12:00:00"), &schema).is_empty());
        assert!(validate(&json!("2026-08-30"), &schema).is_empty());

        let violations = validate(&json!("yesterday at noon"), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("not a valid date-time"));
    }

    #[test]
    fn test_array_items_validated_with_index_paths() {
        let schema = json!({
            "type": "array",
            "minItems": 1,
            "items": { "type": "string" }
        });
        let violations = validate(&json!(["ok", 2, "fine", 4]), &schema);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path, "properties[1]");
        assert_eq!(violations[1].path, "properties[3]");
    }

    #[test]
    fn test_open_schema_passes_unknown_keys() {
        let schema = json!({
            "type": "object",
            "properties": { "known": { "type": "string" } }
        });
        let violations = validate(&json!({ "known": "x", "extra": 99 }), &schema);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_nested_object_paths() {
        let schema = json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "object",
                    "required": ["city"],
                    "properties": { "city": { "type": "string" } }
                }
            }
        });
        let violations = validate(&json!({ "address": {} }), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("properties.address.city is required"));
    }

    #[test]
    fn test_type_list_accepts_any_listed_kind() {
        let schema = json!({ "type": ["string", "null"] });
        assert!(validate(&json!("x"), &schema).is_empty());
        assert!(validate(&Value::Null, &schema).is_empty());
        let violations = validate(&json!(5), &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("expected string or null"));
    }

    #[test]
    fn test_empty_schema_accepts_anything() {
        let schema = json!({});
        assert!(validate(&json!({ "anything": [1, "two", null] }), &schema).is_empty());
    }
}
