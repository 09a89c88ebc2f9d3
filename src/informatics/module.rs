//! The common envelope around a schema-derived module.

use crate::errors::{PropertyError, ResourceError, ValidationError};
use crate::informatics::class::{ModuleClass, ModuleInstance};
use crate::informatics::Catalog;
use crate::serialization::*;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Attributes which belong to the envelope. Every other attribute is forwarded
/// to the inner instance.
pub const ENVELOPE_ATTRIBUTES: [&str; 7] = [
    "display_name",
    "description",
    "tags",
    "status",
    "source_id",
    "status_info",
    "id",
];

const UID: Property<Optional<UuidCodec>> = Property::read_only("uid", "id", Optional(UuidCodec));
const SOURCE_ID: Property<Optional<UuidCodec>> = Property::read_only("source_id", "source_id", Optional(UuidCodec));
const DISPLAY_NAME: Property<Optional<Str>> = Property::optional("display_name", "display_name", Str);
const STATUS: Property<Optional<Str>> = Property::read_only("status", "status", Optional(Str));
const STATUS_INFO: Property<Optional<ListOf<Str>>> =
    Property::read_only("status_info", "status_info", Optional(ListOf(Str)));
const TAGS: Property<Optional<ListOf<Str>>> = Property::optional("tags", "tags", ListOf(Str));
const DESCRIPTION: Property<Optional<Str>> = Property::optional("description", "description", Str);
const SCHEMA_ID: Property<UuidCodec> = Property::write_only("schema_id", "schema_id", UuidCodec);
const MODULE_TYPE: Property<Str> = Property::write_only("module_type", "module_type", Str);
const CONFIG: Property<Json> = Property::write_only("config", "config", Json);

/// A registrable module: envelope fields plus a schema-validated inner instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InformaticsModule {
    pub uid: Option<Uuid>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub status_info: Vec<String>,
    pub tags: Vec<String>,
    pub source_id: Option<Uuid>,
    class: Arc<ModuleClass>,
    inner: Option<ModuleInstance>,
}

fn envelope_error(error: PropertyError) -> ValidationError {
    ValidationError::Invalid(error)
}

impl InformaticsModule {
    /// An envelope whose inner instance has not been constructed yet.
    pub fn pending(class: Arc<ModuleClass>) -> Result<Self, ValidationError> {
        if !class.is_registrable() {
            return Err(ValidationError::NotRegistrable(class.name.clone()));
        }
        Ok(Self {
            uid: None,
            display_name: None,
            description: None,
            status: None,
            status_info: Vec::new(),
            tags: Vec::new(),
            source_id: None,
            class,
            inner: None,
        })
    }

    /// Split `kwargs` into envelope and schema arguments, validate the latter
    /// against `class`, then apply the former.
    ///
    /// `description` belongs to the envelope, and is also passed to the schema
    /// when the schema declares it.
    pub fn new(class: Arc<ModuleClass>, kwargs: Map<String, Value>, catalog: &Catalog) -> Result<Self, ValidationError> {
        let mut module = Self::pending(class)?;
        let (envelope, mut schema): (Map<_, _>, Map<_, _>) = kwargs
            .into_iter()
            .partition(|(k, _)| ENVELOPE_ATTRIBUTES.contains(&k.as_str()));
        if let Some(description) = envelope.get("description") {
            if module.class.field("description").is_some() {
                schema.insert("description".to_string(), description.clone());
            }
        }
        module.instantiate(&schema, catalog)?;
        for (attribute, value) in envelope {
            module.set_envelope(&attribute, &value)?;
        }
        Ok(module)
    }

    /// Validate `config` and attach it as the inner instance.
    pub fn instantiate(&mut self, config: &Map<String, Value>, catalog: &Catalog) -> Result<(), ValidationError> {
        self.inner = Some(ModuleInstance::new(Arc::clone(&self.class), config, catalog)?);
        Ok(())
    }

    /// Build from a platform payload: envelope fields from the top level, the
    /// inner instance from `config`.
    pub fn build(class: Arc<ModuleClass>, data: &Value, catalog: &Catalog) -> Result<Self, ResourceError> {
        let mut module = Self::pending(class)?;
        module.uid = UID.deserialize(data)?;
        module.display_name = DISPLAY_NAME.deserialize(data)?;
        module.description = DESCRIPTION.deserialize(data)?;
        module.status = STATUS.deserialize(data)?;
        module.status_info = STATUS_INFO.deserialize(data)?.unwrap_or_default();
        module.tags = TAGS.deserialize(data)?.unwrap_or_default();
        module.source_id = SOURCE_ID.deserialize(data)?;
        let config = match lookup(data, "config") {
            Some(Value::Object(config)) => config,
            Some(other) => return Err(PropertyError::invalid("config", other, "an object").into()),
            None => {
                return Err(PropertyError::Missing {
                    path: "config".to_string(),
                }
                .into())
            }
        };
        module.instantiate(config, catalog)?;
        Ok(module)
    }

    pub fn class(&self) -> &Arc<ModuleClass> {
        &self.class
    }

    pub fn schema_id(&self) -> Option<Uuid> {
        self.class.schema_id
    }

    pub fn module_type(&self) -> &str {
        &self.class.module_type
    }

    pub fn inner(&self) -> Option<&ModuleInstance> {
        self.inner.as_ref()
    }

    fn inner_for(&self, attribute: &str) -> Result<&ModuleInstance, ValidationError> {
        self.inner.as_ref().ok_or_else(|| ValidationError::NotInstantiated {
            class: self.class.name.clone(),
            attribute: attribute.to_string(),
        })
    }

    /// The envelope's `description`, or else the schema's.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().or_else(|| {
            self.inner
                .as_ref()
                .and_then(|inner| inner.values().get("description"))
                .and_then(Value::as_str)
        })
    }

    /// Read any attribute. Envelope attributes come from the envelope, the rest
    /// from the inner instance, which must exist.
    pub fn get(&self, attribute: &str) -> Result<Value, ValidationError> {
        let encoded = match attribute {
            "id" => UID.codec.encode(&self.uid),
            "display_name" => DISPLAY_NAME.codec.encode(&self.display_name),
            "description" => DESCRIPTION.codec.encode(&self.description().map(str::to_string)),
            "status" => STATUS.codec.encode(&self.status),
            "status_info" => STATUS_INFO.codec.encode(&Some(self.status_info.clone())),
            "tags" => TAGS.codec.encode(&Some(self.tags.clone())),
            "source_id" => SOURCE_ID.codec.encode(&self.source_id),
            _ => {
                let value = self.inner_for(attribute)?.get(attribute)?;
                return Ok(value.cloned().unwrap_or(Value::Null));
            }
        };
        encoded.map_err(envelope_error)
    }

    /// Write any attribute, validating it against the envelope or the schema.
    pub fn set(&mut self, attribute: &str, value: Value, catalog: &Catalog) -> Result<(), ValidationError> {
        if attribute == "description" && self.class.field(attribute).is_some() {
            if let Some(inner) = self.inner.as_mut() {
                inner.set(attribute, value.clone(), catalog)?;
            }
        }
        if ENVELOPE_ATTRIBUTES.contains(&attribute) {
            return self.set_envelope(attribute, &value);
        }
        let class = self.class.name.clone();
        match self.inner.as_mut() {
            Some(inner) => inner.set(attribute, value, catalog),
            None => Err(ValidationError::NotInstantiated {
                class,
                attribute: attribute.to_string(),
            }),
        }
    }

    fn set_envelope(&mut self, attribute: &str, value: &Value) -> Result<(), ValidationError> {
        match attribute {
            "id" => self.uid = UID.codec.decode("id", value).map_err(envelope_error)?,
            "display_name" => {
                self.display_name = DISPLAY_NAME.codec.decode(attribute, value).map_err(envelope_error)?
            }
            "description" => {
                self.description = DESCRIPTION.codec.decode(attribute, value).map_err(envelope_error)?
            }
            "status" => self.status = STATUS.codec.decode(attribute, value).map_err(envelope_error)?,
            "status_info" => {
                self.status_info = STATUS_INFO
                    .codec
                    .decode(attribute, value)
                    .map_err(envelope_error)?
                    .unwrap_or_default()
            }
            "tags" => {
                self.tags = TAGS
                    .codec
                    .decode(attribute, value)
                    .map_err(envelope_error)?
                    .unwrap_or_default()
            }
            "source_id" => self.source_id = SOURCE_ID.codec.decode(attribute, value).map_err(envelope_error)?,
            other => {
                return Err(ValidationError::UnknownField {
                    class: self.class.name.clone(),
                    field: other.to_string(),
                })
            }
        }
        Ok(())
    }

    /// `{display_name, description, tags, schema_id, module_type, config}`.
    /// Server-assigned fields are not written.
    pub fn dump(&self) -> Result<Value, ResourceError> {
        let inner = self.inner_for("config")?;
        let schema_id = self
            .class
            .schema_id
            .ok_or_else(|| ValidationError::NotRegistrable(self.class.name.clone()))?;

        let mut out = Map::new();
        UID.serialize(&self.uid, &mut out)?;
        STATUS.serialize(&self.status, &mut out)?;
        STATUS_INFO.serialize(&Some(self.status_info.clone()), &mut out)?;
        SOURCE_ID.serialize(&self.source_id, &mut out)?;
        DISPLAY_NAME.serialize(&self.display_name, &mut out)?;
        TAGS.serialize(&Some(self.tags.clone()), &mut out)?;
        DESCRIPTION.serialize(&self.description().map(str::to_string), &mut out)?;
        SCHEMA_ID.serialize(&schema_id, &mut out)?;
        MODULE_TYPE.serialize(&self.class.module_type, &mut out)?;
        CONFIG.serialize(&inner.dump(), &mut out)?;
        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    #[fixture]
    #[once]
    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    fn real(key: &str) -> Value {
        json!({"type": "Real", "descriptor_key": key, "lower_bound": 0.0, "upper_bound": 1.0, "units": ""})
    }

    fn paraboloid_kwargs() -> Map<String, Value> {
        json!({
            "name": "bowl",
            "description": "a paraboloid",
            "inputs": [real("x")],
            "output": real("y"),
            "display_name": "My bowl",
            "tags": ["demo"]
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[rstest]
    fn test_constructor_splits_kwargs(catalog: &Catalog) {
        let module = catalog.module("Predictor", "Paraboloid", paraboloid_kwargs()).unwrap();
        assert_eq!(module.display_name.as_deref(), Some("My bowl"));
        assert_eq!(module.tags, vec!["demo"]);
        assert_eq!(module.get("name").unwrap(), json!("bowl"));
        assert_eq!(module.get("type").unwrap(), json!("Paraboloid"));
        assert_eq!(module.description(), Some("a paraboloid"));
        assert!(module.inner().unwrap().values().get("display_name").is_none());
    }

    #[rstest]
    fn test_missing_required_field_fails_at_construction(catalog: &Catalog) {
        let mut kwargs = paraboloid_kwargs();
        kwargs.remove("output");
        let err = catalog.module("Predictor", "Paraboloid", kwargs).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field, .. } if field == "output"));
    }

    #[rstest]
    fn test_nested_validation_names_innermost_field(catalog: &Catalog) {
        let mut kwargs = paraboloid_kwargs();
        kwargs.insert("output".to_string(), json!({"type": "Real", "descriptor_key": "y"}));
        let err = catalog.module("Predictor", "Paraboloid", kwargs).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { class, field } if class == "Real" && field == "lower_bound"));
    }

    #[rstest]
    fn test_unknown_field_rejected(catalog: &Catalog) {
        let mut kwargs = paraboloid_kwargs();
        kwargs.insert("temperature".to_string(), json!(300));
        assert!(matches!(
            catalog.module("Predictor", "Paraboloid", kwargs).unwrap_err(),
            ValidationError::UnknownField { .. }
        ));
    }

    #[rstest]
    fn test_proxy_before_instantiation(catalog: &Catalog) {
        let class = catalog.class("Predictor", "Paraboloid").unwrap();
        let mut module = InformaticsModule::pending(Arc::clone(class)).unwrap();
        assert!(matches!(
            module.get("name").unwrap_err(),
            ValidationError::NotInstantiated { .. }
        ));
        assert!(matches!(
            module.set("name", json!("x"), catalog).unwrap_err(),
            ValidationError::NotInstantiated { .. }
        ));
        module.set("display_name", json!("fine"), catalog).unwrap();
        assert_eq!(module.get("display_name").unwrap(), json!("fine"));
    }

    #[rstest]
    fn test_set_validates(catalog: &Catalog) {
        let mut module = catalog.module("Predictor", "Paraboloid", paraboloid_kwargs()).unwrap();
        module.set("name", json!("renamed"), catalog).unwrap();
        assert_eq!(module.get("name").unwrap(), json!("renamed"));
        assert!(module.set("name", json!(12), catalog).is_err());
    }

    #[rstest]
    fn test_roundtrip(catalog: &Catalog) {
        let module = catalog.module("Predictor", "Paraboloid", paraboloid_kwargs()).unwrap();
        let dumped = module.dump().unwrap();
        assert_eq!(dumped["module_type"], "PREDICTOR");
        assert_eq!(dumped["description"], "a paraboloid");
        assert_eq!(dumped["config"]["output"]["descriptor_key"], "y");
        assert!(dumped.get("id").is_none());

        let rebuilt = catalog.build_module(&dumped).unwrap();
        assert_eq!(rebuilt, module);
    }

    #[rstest]
    fn test_build_reads_server_fields(catalog: &Catalog) {
        let mut payload = catalog
            .module("Predictor", "Paraboloid", paraboloid_kwargs())
            .unwrap()
            .dump()
            .unwrap();
        payload["id"] = json!("8a1f4b3c-2d5e-4f60-9a7b-8c9d0e1f2a3b");
        payload["status"] = json!("READY");
        let built = catalog.build_module(&payload).unwrap();
        assert_eq!(built.status.as_deref(), Some("READY"));
        assert!(built.uid.is_some());
        assert_eq!(built.get("id").unwrap(), payload["id"]);
    }

    fn scalar_min_payload() -> Value {
        json!({
            "schema_id": "db515644-4a27-4627-9b96-db661a711766",
            "module_type": "OBJECTIVE",
            "display_name": "minimize y",
            "description": "keep me",
            "config": {"type": "ScalarMin", "descriptor_key": "y", "lower_bound": 0.0, "upper_bound": 1.0}
        })
    }

    #[rstest]
    fn test_description_kept_without_schema_field(catalog: &Catalog) {
        let built = catalog.build_module(&scalar_min_payload()).unwrap();
        assert_eq!(built.description(), Some("keep me"));
        assert!(built.inner().unwrap().values().get("description").is_none());

        let dumped = built.dump().unwrap();
        assert_eq!(dumped["description"], "keep me");
        assert_eq!(catalog.build_module(&dumped).unwrap(), built);
    }

    #[rstest]
    fn test_description_kwarg_without_schema_field(catalog: &Catalog) {
        let kwargs = json!({
            "descriptor_key": "y",
            "lower_bound": 0.0,
            "upper_bound": 1.0,
            "description": "keep me"
        });
        let module = catalog
            .module("Objective", "ScalarMin", kwargs.as_object().unwrap().clone())
            .unwrap();
        assert_eq!(module.get("description").unwrap(), json!("keep me"));
        assert_eq!(module.dump().unwrap()["description"], "keep me");
    }

    #[rstest]
    fn test_description_falls_back_to_config(catalog: &Catalog) {
        let mut payload = catalog
            .module("Predictor", "Paraboloid", paraboloid_kwargs())
            .unwrap()
            .dump()
            .unwrap();
        payload.as_object_mut().unwrap().remove("description");
        let built = catalog.build_module(&payload).unwrap();
        assert_eq!(built.description, None);
        assert_eq!(built.description(), Some("a paraboloid"));
    }

    #[rstest]
    fn test_set_description_updates_schema_field(catalog: &Catalog) {
        let mut module = catalog.module("Predictor", "Paraboloid", paraboloid_kwargs()).unwrap();
        module.set("description", json!("steeper"), catalog).unwrap();
        assert_eq!(module.description(), Some("steeper"));
        assert_eq!(module.dump().unwrap()["config"]["description"], "steeper");
    }

    #[rstest]
    fn test_build_requires_config(catalog: &Catalog) {
        let payload = json!({"schema_id": "ff26b280-8a8b-46ab-b7aa-0c73ff84b0fd"});
        assert!(matches!(
            catalog.build_module(&payload).unwrap_err(),
            ResourceError::Property(PropertyError::Missing { .. })
        ));
    }
}
