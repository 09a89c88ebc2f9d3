//! Field descriptors.
//!
//! A [Property] binds a field name to a dotted JSON path and a [Codec]. Resources
//! declare their properties as `const` items and use them to read server payloads
//! and write request bodies.

use crate::errors::{PropertyError, ResourceError};
use crate::serialization::PolymorphicSerializable;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// Typed conversion between a JSON value and a Rust value.
pub trait Codec {
    type Value;

    /// Description of acceptable input, used in error messages.
    fn expected(&self) -> String;

    fn decode(&self, field: &str, raw: &Value) -> Result<Self::Value, PropertyError>;

    fn encode(&self, value: &Self::Value) -> Result<Value, PropertyError>;

    /// Value produced when the path is absent. `None` means absence is an error.
    fn missing(&self) -> Option<Self::Value> {
        None
    }
}

/// Get the value at a dotted path, e.g. `config.type`.
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |node, key| node.get(key))
}

/// Write `value` at a dotted path, creating intermediate objects.
pub fn insert(out: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                insert(child, rest, value)
            }
        }
    }
}

/// A field of a resource, addressed by a dotted JSON path.
#[derive(Debug, Clone)]
pub struct Property<C> {
    pub name: Cow<'static, str>,
    pub path: Cow<'static, str>,
    pub codec: C,
    /// Whether the field is written into request bodies.
    pub serializable: bool,
    /// Whether the field is read from platform responses.
    pub deserializable: bool,
}

impl<C> Property<C> {
    pub const fn new(name: &'static str, path: &'static str, codec: C) -> Self {
        Self {
            name: Cow::Borrowed(name),
            path: Cow::Borrowed(path),
            codec,
            serializable: true,
            deserializable: true,
        }
    }

    /// A field which only appears in platform responses, e.g. a server-assigned `id`.
    pub const fn read_only(name: &'static str, path: &'static str, codec: C) -> Self {
        Self {
            name: Cow::Borrowed(name),
            path: Cow::Borrowed(path),
            codec,
            serializable: false,
            deserializable: true,
        }
    }

    /// A field which is only sent to the platform, e.g. a constant `type` tag.
    pub const fn write_only(name: &'static str, path: &'static str, codec: C) -> Self {
        Self {
            name: Cow::Borrowed(name),
            path: Cow::Borrowed(path),
            codec,
            serializable: true,
            deserializable: false,
        }
    }

    /// A property whose name and path are only known at runtime.
    pub fn dynamic(name: impl Into<String>, path: impl Into<String>, codec: C) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            path: Cow::Owned(path.into()),
            codec,
            serializable: true,
            deserializable: true,
        }
    }
}

impl<C: Codec> Property<Optional<C>> {
    pub const fn optional(name: &'static str, path: &'static str, codec: C) -> Self {
        Property::new(name, path, Optional(codec))
    }
}

impl<C: Codec> Property<C> {
    /// Read this field out of a payload.
    pub fn deserialize(&self, data: &Value) -> Result<C::Value, PropertyError> {
        if !self.deserializable {
            return self.codec.missing().ok_or_else(|| PropertyError::WriteOnly {
                field: self.name.to_string(),
            });
        }
        match lookup(data, &self.path) {
            Some(raw) => self.codec.decode(&self.name, raw),
            None => self.codec.missing().ok_or_else(|| PropertyError::Missing {
                path: self.path.to_string(),
            }),
        }
    }

    /// Write this field into a request body.
    pub fn serialize(&self, value: &C::Value, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        if self.serializable {
            insert(out, &self.path, self.codec.encode(value)?);
        }
        Ok(())
    }
}

fn nested(field: &str, error: impl Into<ResourceError>) -> PropertyError {
    PropertyError::Nested {
        field: field.to_string(),
        source: Box::new(error.into()),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Str;

impl Codec for Str {
    type Value = String;

    fn expected(&self) -> String {
        "a string".to_string()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<String, PropertyError> {
        raw.as_str()
            .map(str::to_string)
            .ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))
    }

    fn encode(&self, value: &String) -> Result<Value, PropertyError> {
        Ok(Value::String(value.clone()))
    }
}

/// Integers. Integral floats and numeric strings are accepted on read.
#[derive(Debug, Clone, Copy)]
pub struct Integer;

impl Codec for Integer {
    type Value = i64;

    fn expected(&self) -> String {
        "an integer".to_string()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<i64, PropertyError> {
        let parsed = match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))
    }

    fn encode(&self, value: &i64) -> Result<Value, PropertyError> {
        Ok(Value::from(*value))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Float;

impl Codec for Float {
    type Value = f64;

    fn expected(&self) -> String {
        "a number".to_string()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<f64, PropertyError> {
        let parsed = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))
    }

    fn encode(&self, value: &f64) -> Result<Value, PropertyError> {
        serde_json::Number::from_f64(*value)
            .map(Value::Number)
            .ok_or_else(|| PropertyError::invalid("<float>", &Value::Null, "a finite number"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Boolean;

impl Codec for Boolean {
    type Value = bool;

    fn expected(&self) -> String {
        "a boolean".to_string()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<bool, PropertyError> {
        raw.as_bool()
            .ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))
    }

    fn encode(&self, value: &bool) -> Result<Value, PropertyError> {
        Ok(Value::Bool(*value))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UuidCodec;

impl Codec for UuidCodec {
    type Value = Uuid;

    fn expected(&self) -> String {
        "a UUID".to_string()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<Uuid, PropertyError> {
        raw.as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))
    }

    fn encode(&self, value: &Uuid) -> Result<Value, PropertyError> {
        Ok(Value::String(value.to_string()))
    }
}

/// Timestamps: RFC 3339 strings or epoch milliseconds on read, epoch milliseconds on write.
#[derive(Debug, Clone, Copy)]
pub struct Datetime;

impl Codec for Datetime {
    type Value = OffsetDateTime;

    fn expected(&self) -> String {
        "an ISO-8601 timestamp or epoch milliseconds".to_string()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<OffsetDateTime, PropertyError> {
        let parsed = match raw {
            Value::String(s) => OffsetDateTime::parse(s, &Rfc3339).ok(),
            Value::Number(n) => n
                .as_i64()
                .and_then(|ms| OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).ok()),
            _ => None,
        };
        parsed.ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))
    }

    fn encode(&self, value: &OffsetDateTime) -> Result<Value, PropertyError> {
        let ms = value.unix_timestamp_nanos() / 1_000_000;
        Ok(Value::from(ms as i64))
    }
}

/// A string restricted to a fixed set of legal values.
#[derive(Debug, Clone, Copy)]
pub struct Enumeration(pub &'static [&'static str]);

impl Codec for Enumeration {
    type Value = String;

    fn expected(&self) -> String {
        format!("one of {:?}", self.0)
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<String, PropertyError> {
        match raw.as_str() {
            Some(s) if self.0.contains(&s) => Ok(s.to_string()),
            _ => Err(PropertyError::invalid(field, raw, self.expected())),
        }
    }

    fn encode(&self, value: &String) -> Result<Value, PropertyError> {
        if self.0.contains(&value.as_str()) {
            Ok(Value::String(value.clone()))
        } else {
            Err(PropertyError::invalid("<enumeration>", &Value::String(value.clone()), self.expected()))
        }
    }
}

/// A non-polymorphic nested object, delegated to its serde implementation.
pub struct Object<T>(PhantomData<fn() -> T>);

impl<T> Object<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Serialize + DeserializeOwned> Codec for Object<T> {
    type Value = T;

    fn expected(&self) -> String {
        format!("an object of type {}", std::any::type_name::<T>())
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<T, PropertyError> {
        T::deserialize(raw).map_err(|e| nested(field, e))
    }

    fn encode(&self, value: &T) -> Result<Value, PropertyError> {
        serde_json::to_value(value).map_err(|e| nested(std::any::type_name::<T>(), e))
    }
}

/// A nested member of a polymorphic family, dispatched on its discriminator.
pub struct Polymorphic<T>(PhantomData<fn() -> T>);

impl<T> Polymorphic<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: PolymorphicSerializable> Codec for Polymorphic<T> {
    type Value = T;

    fn expected(&self) -> String {
        format!("a {}", T::TABLE.family)
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<T, PropertyError> {
        T::build(raw.clone()).map_err(|e| nested(field, e))
    }

    fn encode(&self, value: &T) -> Result<Value, PropertyError> {
        value.dump().map_err(|e| nested(T::TABLE.family, e))
    }
}

/// An ordered list.
#[derive(Debug, Clone, Copy)]
pub struct ListOf<C>(pub C);

impl<C: Codec> Codec for ListOf<C> {
    type Value = Vec<C::Value>;

    fn expected(&self) -> String {
        format!("a list of {}", self.0.expected())
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<Self::Value, PropertyError> {
        let items = raw
            .as_array()
            .ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.0.decode(&format!("{field}[{i}]"), item))
            .collect()
    }

    fn encode(&self, value: &Self::Value) -> Result<Value, PropertyError> {
        value
            .iter()
            .map(|item| self.0.encode(item))
            .collect::<Result<_, _>>()
            .map(Value::Array)
    }
}

/// A set, kept in first-seen order. Duplicates are dropped on read and write.
#[derive(Debug, Clone, Copy)]
pub struct SetOf<C>(pub C);

impl<C: Codec> Codec for SetOf<C>
where
    C::Value: PartialEq,
{
    type Value = Vec<C::Value>;

    fn expected(&self) -> String {
        format!("a set of {}", self.0.expected())
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<Self::Value, PropertyError> {
        let items = ListOf(&self.0).decode(field, raw)?;
        let mut unique = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Ok(unique)
    }

    fn encode(&self, value: &Self::Value) -> Result<Value, PropertyError> {
        let mut encoded: Vec<Value> = Vec::with_capacity(value.len());
        for item in value {
            let item = self.0.encode(item)?;
            if !encoded.contains(&item) {
                encoded.push(item);
            }
        }
        Ok(Value::Array(encoded))
    }
}

/// A string-keyed mapping.
#[derive(Debug, Clone, Copy)]
pub struct MappingOf<C>(pub C);

impl<C: Codec> Codec for MappingOf<C> {
    type Value = BTreeMap<String, C::Value>;

    fn expected(&self) -> String {
        format!("a mapping of string to {}", self.0.expected())
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<Self::Value, PropertyError> {
        let entries = raw
            .as_object()
            .ok_or_else(|| PropertyError::invalid(field, raw, self.expected()))?;
        entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), self.0.decode(&format!("{field}.{k}"), v)?)))
            .collect()
    }

    fn encode(&self, value: &Self::Value) -> Result<Value, PropertyError> {
        value
            .iter()
            .map(|(k, v)| Ok((k.clone(), self.0.encode(v)?)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object)
    }
}

/// Missing or `null` reads as `None`. `None` is written as `null`.
#[derive(Debug, Clone, Copy)]
pub struct Optional<C>(pub C);

impl<C: Codec> Codec for Optional<C> {
    type Value = Option<C::Value>;

    fn expected(&self) -> String {
        format!("{} or null", self.0.expected())
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<Self::Value, PropertyError> {
        match raw {
            Value::Null => Ok(None),
            raw => self.0.decode(field, raw).map(Some),
        }
    }

    fn encode(&self, value: &Self::Value) -> Result<Value, PropertyError> {
        match value {
            None => Ok(Value::Null),
            Some(v) => self.0.encode(v),
        }
    }

    fn missing(&self) -> Option<Self::Value> {
        Some(None)
    }
}

/// Raw JSON, passed through untouched.
#[derive(Debug, Clone, Copy)]
pub struct Json;

impl Codec for Json {
    type Value = Value;

    fn expected(&self) -> String {
        "any JSON value".to_string()
    }

    fn decode(&self, _field: &str, raw: &Value) -> Result<Value, PropertyError> {
        Ok(raw.clone())
    }

    fn encode(&self, value: &Value) -> Result<Value, PropertyError> {
        Ok(value.clone())
    }
}

impl<C: Codec> Codec for &C {
    type Value = C::Value;

    fn expected(&self) -> String {
        (*self).expected()
    }

    fn decode(&self, field: &str, raw: &Value) -> Result<Self::Value, PropertyError> {
        (*self).decode(field, raw)
    }

    fn encode(&self, value: &Self::Value) -> Result<Value, PropertyError> {
        (*self).encode(value)
    }

    fn missing(&self) -> Option<Self::Value> {
        (*self).missing()
    }
}

/// Panics if two properties of one type share a JSON path.
#[cfg(test)]
pub(crate) fn assert_unique_paths(paths: &[&str]) {
    let mut seen = std::collections::HashSet::new();
    for path in paths {
        assert!(seen.insert(*path), "duplicate JSON path: {path}");
    }
}
