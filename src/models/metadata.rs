use crate::errors::PropertyError;
use crate::serialization::*;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

/// Server-assigned fields shared by every module. Never sent back to the platform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleMetadata {
    pub uid: Option<Uuid>,
    pub status: Option<String>,
    pub status_info: Vec<String>,
    pub archived: bool,
    pub created_by: Option<Uuid>,
    pub create_time: Option<OffsetDateTime>,
    pub update_time: Option<OffsetDateTime>,
}

impl ModuleMetadata {
    const UID: Property<Optional<UuidCodec>> = Property::read_only("uid", "id", Optional(UuidCodec));
    const STATUS: Property<Optional<Str>> = Property::read_only("status", "status", Optional(Str));
    const STATUS_INFO: Property<Optional<ListOf<Str>>> =
        Property::read_only("status_info", "status_info", Optional(ListOf(Str)));
    const ARCHIVED: Property<Optional<Boolean>> =
        Property::read_only("archived", "archived", Optional(Boolean));
    const CREATED_BY: Property<Optional<UuidCodec>> =
        Property::read_only("created_by", "created_by", Optional(UuidCodec));
    const CREATE_TIME: Property<Optional<Datetime>> =
        Property::read_only("create_time", "create_time", Optional(Datetime));
    const UPDATE_TIME: Property<Optional<Datetime>> =
        Property::read_only("update_time", "update_time", Optional(Datetime));

    pub fn build(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            uid: Self::UID.deserialize(data)?,
            status: Self::STATUS.deserialize(data)?,
            status_info: Self::STATUS_INFO.deserialize(data)?.unwrap_or_default(),
            archived: Self::ARCHIVED.deserialize(data)?.unwrap_or_default(),
            created_by: Self::CREATED_BY.deserialize(data)?,
            create_time: Self::CREATE_TIME.deserialize(data)?,
            update_time: Self::UPDATE_TIME.deserialize(data)?,
        })
    }

    /// Whether the platform is still validating this module.
    pub fn in_progress(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| crate::types::ModuleStatus::IN_PROGRESS.contains(&s))
            .unwrap_or(false)
    }
}

pub(crate) const NAME: Property<Str> = Property::new("name", "config.name", Str);
pub(crate) const DESCRIPTION: Property<Optional<Str>> =
    Property::optional("description", "config.description", Str);
const TYPE: Property<Str> = Property::write_only("typ", "config.type", Str);
const MODULE_TYPE: Property<Str> = Property::write_only("module_type", "module_type", Str);
const DISPLAY_NAME: Property<Str> = Property::write_only("display_name", "display_name", Str);

/// Write the fields every module family shares: its discriminator, module type,
/// name and description. The display name mirrors the name.
pub(crate) fn dump_module_header(
    out: &mut Map<String, Value>,
    module_type: &str,
    discriminator: &str,
    name: &str,
    description: &Option<String>,
) -> Result<(), PropertyError> {
    TYPE.serialize(&discriminator.to_string(), out)?;
    MODULE_TYPE.serialize(&module_type.to_string(), out)?;
    NAME.serialize(&name.to_string(), out)?;
    DESCRIPTION.serialize(description, out)?;
    DISPLAY_NAME.serialize(&name.to_string(), out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unique_paths() {
        assert_unique_paths(&[
            &ModuleMetadata::UID.path,
            &ModuleMetadata::STATUS.path,
            &ModuleMetadata::STATUS_INFO.path,
            &ModuleMetadata::ARCHIVED.path,
            &ModuleMetadata::CREATED_BY.path,
            &ModuleMetadata::CREATE_TIME.path,
            &ModuleMetadata::UPDATE_TIME.path,
            &NAME.path,
            &DESCRIPTION.path,
            &TYPE.path,
            &MODULE_TYPE.path,
            &DISPLAY_NAME.path,
        ]);
    }

    #[test]
    fn test_build_metadata() {
        let data = json!({
            "id": "9e2c6a1b-46e2-4a59-9a48-1ba8d3d3a7e4",
            "status": "VALIDATING",
            "status_info": ["queued"],
            "create_time": 1_600_000_000_000i64
        });
        let meta = ModuleMetadata::build(&data).unwrap();
        assert!(meta.uid.is_some());
        assert!(meta.in_progress());
        assert_eq!(meta.status_info, vec!["queued"]);
        assert!(!meta.archived);
        assert!(meta.create_time.is_some());
    }

    #[test]
    fn test_header_layout() {
        let mut out = Map::new();
        dump_module_header(&mut out, "PREDICTOR", "Simple", "p1", &None).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({
                "module_type": "PREDICTOR",
                "display_name": "p1",
                "config": {"type": "Simple", "name": "p1", "description": null}
            })
        );
    }
}
