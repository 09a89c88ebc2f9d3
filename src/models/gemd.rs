//! Minimal mirror of the GEMD identifiers needed to delete data objects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A reference to a GEMD object by one of its unique identifiers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkByUid {
    pub scope: String,
    pub id: String,
}

impl LinkByUid {
    pub fn new(scope: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            id: id.into(),
        }
    }

    /// A reference using the platform-assigned id.
    pub fn platform(id: uuid::Uuid) -> Self {
        Self::new("id", id.to_string())
    }

    /// Prefer the `auto` scope, otherwise the first uid the entity carries.
    pub fn from_entity(entity: &GemdEntity) -> Option<Self> {
        entity
            .uids
            .get_key_value("auto")
            .or_else(|| entity.uids.first())
            .map(|(scope, id)| Self::new(scope.clone(), id.clone()))
    }
}

/// Kinds of GEMD objects and templates.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    PropertyTemplate,
    ConditionTemplate,
    ParameterTemplate,
    ProcessTemplate,
    MaterialTemplate,
    MeasurementTemplate,
    ProcessSpec,
    MaterialSpec,
    IngredientSpec,
    MeasurementSpec,
    ProcessRun,
    MaterialRun,
    IngredientRun,
    MeasurementRun,
}

impl EntityType {
    /// Rank such that an object may only reference objects of a lower rank.
    ///
    /// Deleting in descending order removes referrers before what they refer to.
    pub fn writable_sort_order(self) -> u8 {
        match self {
            EntityType::PropertyTemplate
            | EntityType::ConditionTemplate
            | EntityType::ParameterTemplate => 0,
            EntityType::ProcessTemplate
            | EntityType::MaterialTemplate
            | EntityType::MeasurementTemplate => 1,
            EntityType::ProcessSpec => 2,
            EntityType::MaterialSpec => 3,
            EntityType::IngredientSpec => 4,
            EntityType::MeasurementSpec => 5,
            EntityType::ProcessRun => 6,
            EntityType::MaterialRun => 7,
            EntityType::IngredientRun => 8,
            EntityType::MeasurementRun => 9,
        }
    }
}

/// A GEMD object or template, reduced to what is needed to identify it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GemdEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub uids: IndexMap<String, String>,
}

impl GemdEntity {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            uids: IndexMap::new(),
        }
    }

    pub fn with_uid(mut self, scope: impl Into<String>, id: impl Into<String>) -> Self {
        self.uids.insert(scope.into(), id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn test_prefers_auto_scope() {
        let entity = GemdEntity::new(EntityType::MaterialRun)
            .with_uid("custom", "abc")
            .with_uid("auto", "123");
        assert_eq!(LinkByUid::from_entity(&entity), Some(LinkByUid::new("auto", "123")));
    }

    #[rstest]
    fn test_falls_back_to_first_uid() {
        let entity = GemdEntity::new(EntityType::ProcessSpec)
            .with_uid("lab", "x1")
            .with_uid("erp", "x2");
        assert_eq!(LinkByUid::from_entity(&entity), Some(LinkByUid::new("lab", "x1")));
    }

    #[rstest]
    fn test_no_uids() {
        assert_eq!(LinkByUid::from_entity(&GemdEntity::new(EntityType::MaterialSpec)), None);
    }

    #[rstest]
    #[case(EntityType::PropertyTemplate, EntityType::MaterialTemplate)]
    #[case(EntityType::MaterialTemplate, EntityType::ProcessSpec)]
    #[case(EntityType::MaterialSpec, EntityType::IngredientSpec)]
    #[case(EntityType::MeasurementSpec, EntityType::ProcessRun)]
    #[case(EntityType::IngredientRun, EntityType::MeasurementRun)]
    fn test_sort_order(#[case] referenced: EntityType, #[case] referrer: EntityType) {
        assert!(referenced.writable_sort_order() < referrer.writable_sort_order())
    }
}
