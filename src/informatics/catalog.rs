//! The declarative module catalog and the definition merge.

use crate::errors::SchemaError;
use crate::informatics::names::{hoisted_module_type, pascalize};
use crate::types::ModuleType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

/// Module schemas published by the platform, bundled with this crate.
pub const BUILTIN_SCHEMAS: &str = include_str!("schemas.json");

/// One registrable module as published by the platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub module_type: ModuleType,
    pub display_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub schema: Value,
}

/// Parse a JSON list of catalog entries.
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, SchemaError> {
    Ok(serde_json::from_str(json)?)
}

/// A named schema in the merged definition pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Key in the pool, which `$ref`s name.
    pub key: String,
    /// Class name, taken from the schema's `title`.
    pub title: String,
    pub module_type: String,
    /// Only present for top-level catalog entries.
    pub schema_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub tags: Vec<String>,
    /// The schema with its own `definitions` block removed.
    pub schema: Value,
}

/// Every definition of a catalog, top-level entries first.
#[derive(Debug, Clone, Default)]
pub struct MergedSchemas {
    pub definitions: IndexMap<String, Definition>,
}

fn title_of(schema: &Value) -> Option<String> {
    schema.get("title").and_then(Value::as_str).map(str::to_string)
}

fn strip_definitions(schema: &Value) -> (Value, Option<serde_json::Map<String, Value>>) {
    let mut schema = schema.clone();
    let nested = schema
        .as_object_mut()
        .and_then(|o| o.remove("definitions"))
        .and_then(|d| match d {
            Value::Object(map) => Some(map),
            _ => None,
        });
    (schema, nested)
}

/// Merge the catalog into one definition pool.
///
/// Each entry's schema is registered under its title. Nested `definitions` are
/// hoisted into the pool under their pascalized key; the first definition of a
/// key wins and keys already taken by a top-level schema are left alone.
pub fn load_schemas(entries: &[CatalogEntry]) -> Result<MergedSchemas, SchemaError> {
    let mut merged = MergedSchemas::default();
    let mut schema_ids = HashSet::with_capacity(entries.len());
    let mut hoisted: IndexMap<String, Value> = IndexMap::new();

    for entry in entries {
        if !schema_ids.insert(entry.id) {
            return Err(SchemaError::DuplicateSchemaId(entry.id));
        }
        if !entry.schema.is_object() {
            return Err(SchemaError::Malformed {
                definition: entry.display_name.clone(),
                reason: "schema is not an object".to_string(),
            });
        }
        let title = title_of(&entry.schema).ok_or(SchemaError::MissingTitle { schema_id: entry.id })?;
        if merged.definitions.contains_key(&title) {
            return Err(SchemaError::DuplicateTitle {
                schema_id: entry.id,
                title,
            });
        }

        let (schema, nested) = strip_definitions(&entry.schema);
        for (key, subschema) in nested.into_iter().flatten() {
            hoisted.entry(key).or_insert(subschema);
        }

        merged.definitions.insert(
            title.clone(),
            Definition {
                key: title.clone(),
                title,
                module_type: entry.module_type.to_string(),
                schema_id: Some(entry.id),
                display_name: Some(entry.display_name.clone()),
                tags: entry.tags.clone(),
                schema,
            },
        );
    }

    for (key, subschema) in hoisted {
        let definition_key = pascalize(&key);
        if merged.definitions.contains_key(&definition_key) {
            continue;
        }
        let title = title_of(&subschema).ok_or_else(|| SchemaError::Malformed {
            definition: key.clone(),
            reason: "sub-schema has no title".to_string(),
        })?;
        let (schema, _) = strip_definitions(&subschema);
        merged.definitions.insert(
            definition_key.clone(),
            Definition {
                key: definition_key,
                title,
                module_type: hoisted_module_type(&key),
                schema_id: None,
                display_name: None,
                tags: Vec::new(),
                schema,
            },
        );
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    fn entry(id: &str, module_type: &str, schema: Value) -> CatalogEntry {
        CatalogEntry {
            id: Uuid::parse_str(id).unwrap(),
            module_type: ModuleType::new(module_type.to_string()),
            display_name: "test".to_string(),
            tags: vec![],
            schema,
        }
    }

    fn real_descriptor(title: &str) -> Value {
        json!({"type": "object", "title": title, "required": [], "properties": {}})
    }

    #[rstest]
    fn test_hoists_first_definition() {
        let a = entry(
            "00000000-0000-0000-0000-000000000001",
            "PREDICTOR",
            json!({"title": "A", "definitions": {"orion_real_descriptor": real_descriptor("First")}}),
        );
        let b = entry(
            "00000000-0000-0000-0000-000000000002",
            "PREDICTOR",
            json!({"title": "B", "definitions": {"orion_real_descriptor": real_descriptor("Second")}}),
        );
        let merged = load_schemas(&[a, b]).unwrap();
        let keys: Vec<_> = merged.definitions.keys().cloned().collect();
        assert_eq!(keys, vec!["A", "B", "OrionRealDescriptor"]);

        let hoisted = &merged.definitions["OrionRealDescriptor"];
        assert_eq!(hoisted.title, "First");
        assert_eq!(hoisted.module_type, "Descriptor");
        assert_eq!(hoisted.schema_id, None);
        assert!(merged.definitions["A"].schema.get("definitions").is_none());
    }

    #[rstest]
    fn test_top_level_key_is_not_overwritten() {
        let a = entry(
            "00000000-0000-0000-0000-000000000001",
            "OBJECTIVE",
            json!({"title": "ScalarMin", "definitions": {"scalar_min": real_descriptor("Shadow")}}),
        );
        let merged = load_schemas(&[a]).unwrap();
        assert_eq!(merged.definitions.len(), 1);
        assert_eq!(merged.definitions["ScalarMin"].module_type, "OBJECTIVE");
    }

    #[rstest]
    fn test_duplicate_schema_id() {
        let id = "00000000-0000-0000-0000-000000000001";
        let err = load_schemas(&[
            entry(id, "SCORE", json!({"title": "A"})),
            entry(id, "SCORE", json!({"title": "B"})),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSchemaId(_)));
    }

    #[rstest]
    fn test_missing_title() {
        let err = load_schemas(&[entry("00000000-0000-0000-0000-000000000001", "SCORE", json!({}))])
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingTitle { .. }));
    }

    #[rstest]
    fn test_builtin_catalog_parses() {
        let entries = parse_catalog(BUILTIN_SCHEMAS).unwrap();
        assert_eq!(entries.len(), 14);
        let merged = load_schemas(&entries).unwrap();
        assert_eq!(
            merged.definitions.values().filter(|d| d.schema_id.is_some()).count(),
            14
        );
    }
}
