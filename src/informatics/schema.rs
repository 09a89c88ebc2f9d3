//! JSON-Schema fragments compiled into validating codecs.

use crate::errors::{PropertyError, ResourceError, SchemaError, ValidationError};
use crate::informatics::names::ref_target;
use crate::informatics::Catalog;
use crate::serialization::Codec;
use itertools::Itertools;
use serde_json::Value;
use std::collections::HashSet;

/// The subset of JSON-Schema used by platform module schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaCodec {
    String,
    Number,
    Integer,
    Boolean,
    /// A fixed set of legal values.
    Enum(Vec<Value>),
    Array(Box<SchemaCodec>),
    /// Another definition of the pool, by key.
    Ref(String),
    /// The first alternative which accepts a value wins.
    OneOf(Vec<SchemaCodec>),
    /// An object without declared properties.
    Object,
    Any,
}

impl SchemaCodec {
    /// Compile the schema of a property of `definition`. Every `$ref` must name one of `keys`.
    pub fn compile(definition: &str, schema: &Value, keys: &HashSet<String>) -> Result<Self, SchemaError> {
        let malformed = |reason: &str| SchemaError::Malformed {
            definition: definition.to_string(),
            reason: reason.to_string(),
        };

        if let Some(reference) = schema.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| malformed("$ref is not a string"))?;
            return match ref_target(reference) {
                Some(key) if keys.contains(key) => Ok(SchemaCodec::Ref(key.to_string())),
                _ => Err(SchemaError::UnresolvedRef {
                    definition: definition.to_string(),
                    reference: reference.to_string(),
                }),
            };
        }
        if let Some(alternatives) = schema.get("oneOf") {
            let alternatives = alternatives
                .as_array()
                .ok_or_else(|| malformed("oneOf is not a list"))?;
            return alternatives
                .iter()
                .map(|alt| Self::compile(definition, alt, keys))
                .collect::<Result<_, _>>()
                .map(SchemaCodec::OneOf);
        }
        if let Some(values) = schema.get("enum") {
            let values = values.as_array().ok_or_else(|| malformed("enum is not a list"))?;
            return Ok(SchemaCodec::Enum(values.clone()));
        }

        let codec = match schema.get("type").and_then(Value::as_str) {
            None => SchemaCodec::Any,
            Some("string") => SchemaCodec::String,
            Some("number") => SchemaCodec::Number,
            Some("integer") => SchemaCodec::Integer,
            Some("boolean") => SchemaCodec::Boolean,
            Some("object") => SchemaCodec::Object,
            Some("array") => match schema.get("items") {
                Some(items) => SchemaCodec::Array(Box::new(Self::compile(definition, items, keys)?)),
                None => SchemaCodec::Array(Box::new(SchemaCodec::Any)),
            },
            Some(other) => return Err(malformed(&format!("unsupported type \"{other}\""))),
        };
        Ok(codec)
    }

    pub fn describe(&self) -> String {
        match self {
            SchemaCodec::String => "a string".to_string(),
            SchemaCodec::Number => "a number".to_string(),
            SchemaCodec::Integer => "an integer".to_string(),
            SchemaCodec::Boolean => "a boolean".to_string(),
            SchemaCodec::Enum(values) => format!(
                "one of {}",
                values.iter().map(Value::to_string).join(", ")
            ),
            SchemaCodec::Array(items) => format!("a list of {}", items.describe()),
            SchemaCodec::Ref(key) => format!("a {key}"),
            SchemaCodec::OneOf(alts) => format!(
                "one of: {}",
                alts.iter().map(SchemaCodec::describe).join("; ")
            ),
            SchemaCodec::Object => "an object".to_string(),
            SchemaCodec::Any => "any value".to_string(),
        }
    }

    /// Pair this codec with the catalog its references resolve against.
    pub fn bind<'a>(&'a self, catalog: &'a Catalog) -> BoundSchema<'a> {
        BoundSchema { codec: self, catalog }
    }

    /// Validate `value`, returning it normalised (nested defaults filled in).
    pub fn validate(&self, field: &str, value: &Value, catalog: &Catalog) -> Result<Value, ValidationError> {
        let invalid = || ValidationError::Invalid(PropertyError::invalid(field, value, self.describe()));
        match self {
            SchemaCodec::String => value.is_string().then(|| value.clone()).ok_or_else(invalid),
            SchemaCodec::Number => value.is_number().then(|| value.clone()).ok_or_else(invalid),
            SchemaCodec::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
                Value::Number(n) => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| Value::from(f as i64))
                    .ok_or_else(invalid),
                _ => Err(invalid()),
            },
            SchemaCodec::Boolean => value.is_boolean().then(|| value.clone()).ok_or_else(invalid),
            SchemaCodec::Enum(values) => values.contains(value).then(|| value.clone()).ok_or_else(invalid),
            SchemaCodec::Array(items) => {
                let elements = value.as_array().ok_or_else(invalid)?;
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| items.validate(&format!("{field}[{i}]"), element, catalog))
                    .collect::<Result<_, _>>()
                    .map(Value::Array)
            }
            SchemaCodec::Ref(key) => match catalog.class_by_key(key) {
                Some(class) => class.validate(value, catalog).map(Value::Object),
                None => Err(invalid()),
            },
            SchemaCodec::OneOf(alternatives) => alternatives
                .iter()
                .find_map(|alt| alt.validate(field, value, catalog).ok())
                .ok_or_else(invalid),
            SchemaCodec::Object => value.is_object().then(|| value.clone()).ok_or_else(invalid),
            SchemaCodec::Any => Ok(value.clone()),
        }
    }
}

/// A [SchemaCodec] usable wherever a [Codec] is expected.
#[derive(Debug, Clone, Copy)]
pub struct BoundSchema<'a> {
    codec: &'a SchemaCodec,
    catalog: &'a Catalog,
}

impl Codec for BoundSchema<'_> {
    type Value = Value;

    fn expected(&self) -> String {
        self.codec.describe()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<Value, PropertyError> {
        self.codec
            .validate(field, raw, self.catalog)
            .map_err(|e| match e {
                ValidationError::Invalid(e) => e,
                other => PropertyError::Nested {
                    field: field.to_string(),
                    source: Box::new(ResourceError::Validation(other)),
                },
            })
    }

    fn encode(&self, value: &Value) -> Result<Value, PropertyError> {
        self.decode("<value>", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    fn keys() -> HashSet<String> {
        HashSet::from(["OrionRealDescriptor".to_string()])
    }

    #[rstest]
    #[case(json!({"type": "string"}), SchemaCodec::String)]
    #[case(json!({"type": "integer"}), SchemaCodec::Integer)]
    #[case(json!({"enum": ["MEI"], "type": "string", "default": "MEI"}), SchemaCodec::Enum(vec![json!("MEI")]))]
    #[case(json!({"type": "array", "items": {"type": "number"}}), SchemaCodec::Array(Box::new(SchemaCodec::Number)))]
    #[case(json!({"$ref": "#/definitions/OrionRealDescriptor"}), SchemaCodec::Ref("OrionRealDescriptor".to_string()))]
    #[case(json!({"type": "object"}), SchemaCodec::Object)]
    fn test_compile(#[case] schema: Value, #[case] expected: SchemaCodec) {
        assert_eq!(SchemaCodec::compile("Test", &schema, &keys()).unwrap(), expected);
    }

    #[rstest]
    fn test_unresolved_ref() {
        let schema = json!({"type": "array", "items": {"oneOf": [{"$ref": "#/definitions/Missing"}]}});
        let err = SchemaCodec::compile("Test", &schema, &keys()).unwrap_err();
        assert!(
            matches!(err, SchemaError::UnresolvedRef { definition, reference } if definition == "Test" && reference == "#/definitions/Missing")
        );
    }

    #[rstest]
    fn test_unsupported_type() {
        let err = SchemaCodec::compile("Test", &json!({"type": "tuple"}), &keys()).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[rstest]
    #[case(SchemaCodec::String, json!("a"), true)]
    #[case(SchemaCodec::String, json!(1), false)]
    #[case(SchemaCodec::Number, json!(1.5), true)]
    #[case(SchemaCodec::Integer, json!(2.0), true)]
    #[case(SchemaCodec::Integer, json!(2.5), false)]
    #[case(SchemaCodec::Enum(vec![json!("MEI")]), json!("MLI"), false)]
    #[case(SchemaCodec::Array(Box::new(SchemaCodec::Boolean)), json!([true, false]), true)]
    #[case(SchemaCodec::OneOf(vec![SchemaCodec::Integer, SchemaCodec::String]), json!("x"), true)]
    #[case(SchemaCodec::OneOf(vec![SchemaCodec::Integer, SchemaCodec::String]), json!(null), false)]
    fn test_validate(#[case] codec: SchemaCodec, #[case] value: Value, #[case] ok: bool) {
        let catalog = Catalog::empty();
        assert_eq!(codec.validate("field", &value, &catalog).is_ok(), ok);
    }
}
