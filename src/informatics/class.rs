//! Classes compiled from schema definitions, and their instances.

use crate::errors::{PropertyError, SchemaError, ValidationError};
use crate::informatics::catalog::Definition;
use crate::informatics::schema::SchemaCodec;
use crate::informatics::Catalog;
use crate::serialization::{Codec, Property};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// A property declared by a schema.
#[derive(Debug, Clone)]
pub struct Field {
    pub property: Property<SchemaCodec>,
    pub required: bool,
    pub default: Option<Value>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.property.name
    }

    pub fn codec(&self) -> &SchemaCodec {
        &self.property.codec
    }
}

/// A concrete type synthesized from one definition of the catalog.
#[derive(Debug)]
pub struct ModuleClass {
    /// Class name, the schema's title.
    pub name: String,
    /// Key of the definition this class was compiled from.
    pub key: String,
    pub module_type: String,
    /// Only registrable (top-level) modules have a schema id.
    pub schema_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub tags: Vec<String>,
    pub fields: Vec<Field>,
    /// Whether properties the schema does not declare are accepted.
    pub additional_properties: bool,
}

impl PartialEq for ModuleClass {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.schema_id == other.schema_id
    }
}

impl ModuleClass {
    pub(crate) fn compile(definition: &Definition, keys: &HashSet<String>) -> Result<Self, SchemaError> {
        let schema = &definition.schema;
        let required: HashSet<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields = match schema.get("properties") {
            None => Vec::new(),
            Some(Value::Object(properties)) => properties
                .iter()
                .map(|(name, property)| {
                    Ok(Field {
                        property: Property::dynamic(
                            name.clone(),
                            name.clone(),
                            SchemaCodec::compile(&definition.key, property, keys)?,
                        ),
                        required: required.contains(name.as_str()),
                        default: property.get("default").cloned(),
                    })
                })
                .collect::<Result<_, SchemaError>>()?,
            Some(_) => {
                return Err(SchemaError::Malformed {
                    definition: definition.key.clone(),
                    reason: "properties is not an object".to_string(),
                })
            }
        };

        let additional_properties = ["additionalProperties", "additional_properties"]
            .iter()
            .filter_map(|k| schema.get(*k).and_then(Value::as_bool))
            .all(|allowed| allowed);

        Ok(Self {
            name: definition.title.clone(),
            key: definition.key.clone(),
            module_type: definition.module_type.clone(),
            schema_id: definition.schema_id,
            display_name: definition.display_name.clone(),
            tags: definition.tags.clone(),
            fields,
            additional_properties,
        })
    }

    pub fn is_registrable(&self) -> bool {
        self.schema_id.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Check `value` against this class and return it normalised.
    ///
    /// Missing fields with a default are filled in, missing required fields
    /// without one are an error, and `null` counts as missing.
    pub fn validate(&self, value: &Value, catalog: &Catalog) -> Result<Map<String, Value>, ValidationError> {
        let given = value.as_object().ok_or_else(|| {
            ValidationError::Invalid(PropertyError::invalid(&self.name, value, format!("a {} object", self.name)))
        })?;

        if !self.additional_properties {
            if let Some(unknown) = given.keys().find(|k| self.field(k).is_none()) {
                return Err(ValidationError::UnknownField {
                    class: self.name.clone(),
                    field: unknown.clone(),
                });
            }
        }

        let mut normalised = Map::new();
        for field in &self.fields {
            match given.get(field.name()).filter(|v| !v.is_null()) {
                Some(raw) => {
                    let decoded = field
                        .codec()
                        .bind(catalog)
                        .decode(field.name(), raw)
                        .map_err(nested_validation)?;
                    normalised.insert(field.name().to_string(), decoded);
                }
                None => match &field.default {
                    Some(default) => {
                        normalised.insert(field.name().to_string(), default.clone());
                    }
                    None if field.required => {
                        return Err(ValidationError::MissingField {
                            class: self.name.clone(),
                            field: field.name().to_string(),
                        })
                    }
                    None => {}
                },
            }
        }

        if self.additional_properties {
            for (k, v) in given {
                if self.field(k).is_none() {
                    normalised.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(normalised)
    }
}

/// Unwrap a nested validation failure so callers see the innermost cause.
fn nested_validation(error: PropertyError) -> ValidationError {
    match error {
        PropertyError::Nested { source, .. } => match *source {
            crate::errors::ResourceError::Validation(inner) => inner,
            other => ValidationError::Invalid(PropertyError::Nested {
                field: String::new(),
                source: Box::new(other),
            }),
        },
        other => ValidationError::Invalid(other),
    }
}

/// Schema-validated values of one [ModuleClass].
#[derive(Debug, Clone)]
pub struct ModuleInstance {
    class: Arc<ModuleClass>,
    values: Map<String, Value>,
}

impl PartialEq for ModuleInstance {
    fn eq(&self, other: &Self) -> bool {
        self.class.key == other.class.key && self.values == other.values
    }
}

impl ModuleInstance {
    /// Validate `kwargs` against `class`.
    pub fn new(class: Arc<ModuleClass>, kwargs: &Map<String, Value>, catalog: &Catalog) -> Result<Self, ValidationError> {
        let values = class.validate(&Value::Object(kwargs.clone()), catalog)?;
        Ok(Self { class, values })
    }

    pub fn class(&self) -> &Arc<ModuleClass> {
        &self.class
    }

    /// The value of a declared field, `None` if it is unset.
    pub fn get(&self, attribute: &str) -> Result<Option<&Value>, ValidationError> {
        if self.class.field(attribute).is_none() && !self.class.additional_properties {
            return Err(ValidationError::UnknownField {
                class: self.class.name.clone(),
                field: attribute.to_string(),
            });
        }
        Ok(self.values.get(attribute))
    }

    /// Validate and store a field.
    pub fn set(&mut self, attribute: &str, value: Value, catalog: &Catalog) -> Result<(), ValidationError> {
        let value = match self.class.field(attribute) {
            Some(field) => field
                .codec()
                .bind(catalog)
                .decode(attribute, &value)
                .map_err(nested_validation)?,
            None if self.class.additional_properties => value,
            None => {
                return Err(ValidationError::UnknownField {
                    class: self.class.name.clone(),
                    field: attribute.to_string(),
                })
            }
        };
        self.values.insert(attribute.to_string(), value);
        Ok(())
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn dump(&self) -> Value {
        Value::Object(self.values.clone())
    }
}
