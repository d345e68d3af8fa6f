//! Typed constraint tree parsed from a JSON-Schema-like descriptor
//!
//! Type definitions store their `properties_schema` as raw JSON. Before
//! validation the descriptor is parsed once into this constraint tree,
//! so the validator walks typed nodes instead of duck-typing an untyped
//! object at every level. Unknown descriptor keys are ignored: the
//! supported subset is `type`, `enum`, `minimum`/`maximum`,
//! `minLength`/`maxLength`/`pattern`/`format`, `minItems`/`maxItems`/
//! `items`, and `required`/`properties`.

use std::collections::BTreeMap;

use serde_json::Value;

/// Runtime kinds a schema `type` constraint can name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Null,
    Boolean,
    Number,
    /// Whole-number numeric; `3.0` counts, `3.5` does not
    Integer,
    String,
    Array,
    Object,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// Whether `value` matches this schema type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Null => value.is_null(),
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::Integer => match value.as_f64() {
                Some(n) => n.fract() == 0.0,
                None => false,
            },
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric bound constraints (inclusive)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberConstraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// String constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    /// Only `date-time` is recognized; other formats pass through
    pub format: Option<String>,
}

/// Array constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayConstraints {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub items: Option<Box<SchemaNode>>,
}

/// Object constraints
///
/// The schema is open: keys absent from `properties` pass through
/// un-validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectConstraints {
    pub required: Vec<String>,
    pub properties: BTreeMap<String, SchemaNode>,
}

/// One node of the parsed schema descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// Accepted runtime kinds; `None` means any kind
    pub types: Option<Vec<SchemaType>>,
    /// Allowed literal values
    pub enum_values: Option<Vec<Value>>,
    pub number: NumberConstraints,
    pub string: StringConstraints,
    pub array: ArrayConstraints,
    pub object: ObjectConstraints,
}

impl SchemaNode {
    /// Parse a raw schema descriptor into a constraint tree.
    ///
    /// Parsing is tolerant: keys with unexpected shapes are skipped
    /// rather than rejected, so a half-formed descriptor still validates
    /// the constraints it does express.
    pub fn parse(schema: &Value) -> Self {
        let Some(map) = schema.as_object() else {
            return Self::default();
        };

        let types = map.get("type").and_then(|t| match t {
            Value::String(s) => SchemaType::parse(s).map(|st| vec![st]),
            Value::Array(entries) => {
                let parsed: Vec<SchemaType> = entries
                    .iter()
                    .filter_map(|e| e.as_str().and_then(SchemaType::parse))
                    .collect();
                if parsed.is_empty() { None } else { Some(parsed) }
            }
            _ => None,
        });

        let enum_values = map
            .get("enum")
            .and_then(Value::as_array)
            .map(|entries| entries.to_vec());

        let number = NumberConstraints {
            minimum: map.get("minimum").and_then(Value::as_f64),
            maximum: map.get("maximum").and_then(Value::as_f64),
        };

        let string = StringConstraints {
            min_length: map.get("minLength").and_then(as_usize),
            max_length: map.get("maxLength").and_then(as_usize),
            pattern: map
                .get("pattern")
                .and_then(Value::as_str)
                .map(String::from),
            format: map.get("format").and_then(Value::as_str).map(String::from),
        };

        let array = ArrayConstraints {
            min_items: map.get("minItems").and_then(as_usize),
            max_items: map.get("maxItems").and_then(as_usize),
            items: map.get("items").map(|s| Box::new(Self::parse(s))),
        };

        let object = ObjectConstraints {
            required: map
                .get("required")
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|e| e.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
            properties: map
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(key, prop_schema)| (key.clone(), Self::parse(prop_schema)))
                        .collect()
                })
                .unwrap_or_default(),
        };

        Self {
            types,
            enum_values,
            number,
            string,
            array,
            object,
        }
    }
}

fn as_usize(value: &Value) -> Option<usize> {
    value.as_u64().map(|n| n as usize)
}

/// The runtime kind of a JSON value, for mismatch messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_type() {
        let node = SchemaNode::parse(&json!({ "type": "string" }));
        assert_eq!(node.types, Some(vec![SchemaType::String]));
    }

    #[test]
    fn test_parse_type_list() {
        let node = SchemaNode::parse(&json!({ "type": ["string", "null"] }));
        assert_eq!(
            node.types,
            Some(vec![SchemaType::String, SchemaType::Null])
        );
    }

    #[test]
    fn test_parse_ignores_unknown_type_names() {
        let node = SchemaNode::parse(&json!({ "type": "tuple" }));
        assert_eq!(node.types, None);
    }

    #[test]
    fn test_parse_nested_properties() {
        let node = SchemaNode::parse(&json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        }));

        assert_eq!(node.object.required, vec!["name".to_string()]);
        let name = &node.object.properties["name"];
        assert_eq!(name.string.min_length, Some(1));
        let tags = &node.object.properties["tags"];
        assert!(tags.array.items.is_some());
    }

    #[test]
    fn test_parse_non_object_descriptor_is_unconstrained() {
        let node = SchemaNode::parse(&json!("not a schema"));
        assert_eq!(node, SchemaNode::default());
    }

    #[test]
    fn test_integer_matches_whole_numbers_only() {
        assert!(SchemaType::Integer.matches(&json!(3)));
        assert!(SchemaType::Integer.matches(&json!(3.0)));
        assert!(!SchemaType::Integer.matches(&json!(3.5)));
        assert!(!SchemaType::Integer.matches(&json!("3")));
    }
}
