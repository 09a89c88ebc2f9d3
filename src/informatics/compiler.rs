//! Compile a catalog of module schemas into an immutable registry of classes.

use crate::errors::{DispatchError, PropertyError, ResourceError, SchemaError, ValidationError};
use crate::informatics::catalog::{load_schemas, parse_catalog, CatalogEntry, BUILTIN_SCHEMAS};
use crate::informatics::class::{ModuleClass, ModuleInstance};
use crate::informatics::module::InformaticsModule;
use crate::informatics::names::pascalize;
use crate::serialization::{lookup, Codec, UuidCodec};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Every class of a compiled catalog.
///
/// Built once by [compile_catalog] and never modified afterwards; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct Catalog {
    classes: IndexMap<String, Arc<ModuleClass>>,
    by_schema_id: IndexMap<Uuid, Arc<ModuleClass>>,
    buckets: BTreeMap<String, BTreeMap<String, Arc<ModuleClass>>>,
}

/// Merge, resolve and compile `entries`. Any unresolved `$ref` fails the whole catalog.
pub fn compile_catalog(entries: &[CatalogEntry]) -> Result<Catalog, SchemaError> {
    let merged = load_schemas(entries)?;
    let keys: HashSet<String> = merged.definitions.keys().cloned().collect();

    let mut catalog = Catalog::default();
    for definition in merged.definitions.values() {
        let class = Arc::new(ModuleClass::compile(definition, &keys)?);
        if let Some(schema_id) = class.schema_id {
            catalog.by_schema_id.insert(schema_id, Arc::clone(&class));
        }
        let bucket = catalog
            .buckets
            .entry(pascalize(&class.module_type.to_lowercase()))
            .or_default();
        if bucket.contains_key(&class.name) {
            log::debug!(
                "{} ({}) is shadowed by an earlier class of the same name",
                class.name,
                class.key
            );
        } else {
            bucket.insert(class.name.clone(), Arc::clone(&class));
        }
        catalog.classes.insert(class.key.clone(), class);
    }

    log::debug!(
        "compiled {} definitions, {} registrable modules",
        catalog.classes.len(),
        catalog.by_schema_id.len()
    );
    Ok(catalog)
}

impl Catalog {
    /// Compile the catalog bundled with this crate.
    pub fn builtin() -> Result<Self, SchemaError> {
        compile_catalog(&parse_catalog(BUILTIN_SCHEMAS)?)
    }

    /// A catalog without classes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<ModuleClass>> {
        self.classes.values()
    }

    /// Classes which carry a schema id, in catalog order.
    pub fn registrable(&self) -> impl Iterator<Item = &Arc<ModuleClass>> {
        self.by_schema_id.values()
    }

    pub fn class_by_key(&self, key: &str) -> Option<&Arc<ModuleClass>> {
        self.classes.get(key)
    }

    pub fn class_by_schema_id(&self, schema_id: &Uuid) -> Option<&Arc<ModuleClass>> {
        self.by_schema_id.get(schema_id)
    }

    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Classes of one module type, e.g. `Descriptor` or `Predictor`, by class name.
    pub fn bucket(&self, name: &str) -> Option<&BTreeMap<String, Arc<ModuleClass>>> {
        self.buckets.get(name)
    }

    pub fn class(&self, bucket: &str, name: &str) -> Result<&Arc<ModuleClass>, ValidationError> {
        self.bucket(bucket)
            .and_then(|classes| classes.get(name))
            .ok_or_else(|| ValidationError::UnknownClass {
                bucket: bucket.to_string(),
                name: name.to_string(),
            })
    }

    /// The class a module payload describes, by its `schema_id`.
    pub fn get_type(&self, data: &Value) -> Result<&Arc<ModuleClass>, DispatchError> {
        let raw = lookup(data, "schema_id").ok_or_else(|| DispatchError::MissingDiscriminator {
            family: "module",
            path: "schema_id".to_string(),
        })?;
        UuidCodec
            .decode("schema_id", raw)
            .ok()
            .and_then(|id| self.class_by_schema_id(&id))
            .ok_or_else(|| DispatchError::UnknownDiscriminator {
                family: "module",
                value: raw.as_str().map(str::to_string).unwrap_or_else(|| raw.to_string()),
                legal: self.by_schema_id.keys().map(Uuid::to_string).collect(),
            })
    }

    /// Build a module of whichever class `data["schema_id"]` names.
    pub fn build_module(&self, data: &Value) -> Result<InformaticsModule, ResourceError> {
        let class = self.get_type(data)?;
        InformaticsModule::build(Arc::clone(class), data, self)
    }

    /// Construct a registrable module from keyword arguments, e.g.
    /// `catalog.module("Predictor", "Paraboloid", kwargs)`.
    pub fn module(&self, bucket: &str, name: &str, kwargs: Map<String, Value>) -> Result<InformaticsModule, ValidationError> {
        let class = self.class(bucket, name)?;
        InformaticsModule::new(Arc::clone(class), kwargs, self)
    }

    /// Construct an instance of a shared sub-schema, such as a descriptor or a dimension.
    pub fn block(&self, bucket: &str, name: &str, kwargs: Map<String, Value>) -> Result<ModuleInstance, ValidationError> {
        let class = self.class(bucket, name)?;
        ModuleInstance::new(Arc::clone(class), &kwargs, self)
    }

    /// Build a shared sub-schema instance from its JSON form.
    pub fn build_block(&self, bucket: &str, name: &str, data: &Value) -> Result<ModuleInstance, ValidationError> {
        match data {
            Value::Object(kwargs) => self.block(bucket, name, kwargs.clone()),
            other => Err(ValidationError::Invalid(PropertyError::invalid(name, other, "an object"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModuleType;
    use rstest::*;
    use serde_json::json;

    #[fixture]
    #[once]
    fn builtin() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[rstest]
    fn test_one_class_per_entry(builtin: &Catalog) {
        let entries = parse_catalog(BUILTIN_SCHEMAS).unwrap();
        assert_eq!(builtin.registrable().count(), entries.len());
        for entry in &entries {
            let class = builtin.class_by_schema_id(&entry.id).unwrap();
            assert_eq!(Some(entry.id), class.schema_id);
            assert_eq!(class.module_type, entry.module_type.as_str());
        }
    }

    #[rstest]
    #[case("Predictor", "Paraboloid")]
    #[case("Score", "MEI")]
    #[case("Capability", "Univariate")]
    #[case("Processor", "Grid")]
    #[case("Descriptor", "Real")]
    #[case("Dimension", "ContinuousDimension")]
    fn test_buckets(builtin: &Catalog, #[case] bucket: &str, #[case] name: &str) {
        assert!(builtin.class(bucket, name).is_ok());
    }

    #[rstest]
    fn test_top_level_class_wins_bucket(builtin: &Catalog) {
        let scalar_min = builtin.class("Objective", "ScalarMin").unwrap();
        assert!(scalar_min.is_registrable());
    }

    #[rstest]
    fn test_unknown_class(builtin: &Catalog) {
        assert!(matches!(
            builtin.class("Predictor", "Oracle").unwrap_err(),
            ValidationError::UnknownClass { .. }
        ));
    }

    #[rstest]
    fn test_unresolved_ref_fails_compilation() {
        let entry = CatalogEntry {
            id: Uuid::new_v4(),
            module_type: ModuleType::new("PREDICTOR".to_string()),
            display_name: "Broken".to_string(),
            tags: vec![],
            schema: json!({
                "title": "Broken",
                "type": "object",
                "properties": {"input": {"$ref": "#/definitions/OrionNothing"}}
            }),
        };
        assert!(matches!(
            compile_catalog(&[entry]).unwrap_err(),
            SchemaError::UnresolvedRef { .. }
        ));
    }

    #[rstest]
    fn test_dispatch_errors(builtin: &Catalog) {
        assert!(matches!(
            builtin.get_type(&json!({"config": {}})).unwrap_err(),
            DispatchError::MissingDiscriminator { .. }
        ));
        match builtin
            .get_type(&json!({"schema_id": "00000000-0000-0000-0000-000000000000"}))
            .unwrap_err()
        {
            DispatchError::UnknownDiscriminator { legal, .. } => assert_eq!(legal.len(), 14),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
