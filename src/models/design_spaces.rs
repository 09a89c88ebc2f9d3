//! Design spaces: the sets of candidate materials a design workflow searches.

use crate::errors::{PropertyError, ResourceError};
use crate::models::metadata::{dump_module_header, DESCRIPTION, NAME};
use crate::models::{DataSource, Descriptor, Dimension, ModuleMetadata};
use crate::serialization::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DESIGN_SPACE_MODULE_TYPE: &str = "DESIGN_SPACE";

/// Largest number of cells (candidates times descriptors) an enumerated design space may hold.
pub const ENUMERATED_CELL_LIMIT: usize = 128 * 2000;

#[derive(Debug, Clone, PartialEq)]
pub enum DesignSpace {
    Product(ProductDesignSpace),
    Enumerated(EnumeratedDesignSpace),
    Formulation(FormulationDesignSpace),
    DataSource(DataSourceDesignSpace),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DesignSpaceKind {
    Product,
    Enumerated,
    Formulation,
    DataSource,
}

macro_rules! each_design_space {
    ($value:expr, $s:ident => $body:expr) => {
        match $value {
            DesignSpace::Product($s) => $body,
            DesignSpace::Enumerated($s) => $body,
            DesignSpace::Formulation($s) => $body,
            DesignSpace::DataSource($s) => $body,
        }
    };
}

impl DesignSpace {
    pub fn name(&self) -> &str {
        each_design_space!(self, s => &s.name)
    }

    pub fn description(&self) -> Option<&str> {
        each_design_space!(self, s => s.description.as_deref())
    }

    pub fn metadata(&self) -> &ModuleMetadata {
        each_design_space!(self, s => &s.metadata)
    }

    pub fn uid(&self) -> Option<Uuid> {
        self.metadata().uid
    }

    /// Reject enumerated design spaces which the platform would refuse to store.
    pub fn check_cell_limit(&self) -> Result<(), ResourceError> {
        if let DesignSpace::Enumerated(s) = self {
            let cells = s.descriptors.len() * s.data.len();
            if cells > ENUMERATED_CELL_LIMIT {
                return Err(ResourceError::Invalid(format!(
                    "EnumeratedDesignSpace only supports up to {} descriptor-values, but {} were given. \
                     Please reduce the number of descriptors or candidates in this design space.",
                    ENUMERATED_CELL_LIMIT, cells
                )));
            }
        }
        Ok(())
    }
}

impl PolymorphicSerializable for DesignSpace {
    type Kind = DesignSpaceKind;

    const TABLE: DiscriminatorTable<DesignSpaceKind> = DiscriminatorTable {
        family: "design space",
        path: "config.type",
        rows: &[
            ("Univariate", DesignSpaceKind::Product, true),
            ("ProductDesignSpace", DesignSpaceKind::Product, false),
            ("EnumeratedDesignSpace", DesignSpaceKind::Enumerated, false),
            ("FormulationDesignSpace", DesignSpaceKind::Formulation, false),
            ("DataSourceDesignSpace", DesignSpaceKind::DataSource, false),
        ],
    };

    fn build(data: Value) -> Result<Self, ResourceError> {
        let d = &data;
        let space = match Self::get_type(d)? {
            DesignSpaceKind::Product => DesignSpace::Product(ProductDesignSpace::read(d)?),
            DesignSpaceKind::Enumerated => DesignSpace::Enumerated(EnumeratedDesignSpace::read(d)?),
            DesignSpaceKind::Formulation => DesignSpace::Formulation(FormulationDesignSpace::read(d)?),
            DesignSpaceKind::DataSource => DesignSpace::DataSource(DataSourceDesignSpace::read(d)?),
        };
        Ok(space)
    }

    fn kind(&self) -> DesignSpaceKind {
        match self {
            DesignSpace::Product(_) => DesignSpaceKind::Product,
            DesignSpace::Enumerated(_) => DesignSpaceKind::Enumerated,
            DesignSpace::Formulation(_) => DesignSpaceKind::Formulation,
            DesignSpace::DataSource(_) => DesignSpaceKind::DataSource,
        }
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        let mut out = Map::new();
        each_design_space!(self, s => s.write(&mut out))?;
        dump_module_header(
            &mut out,
            DESIGN_SPACE_MODULE_TYPE,
            self.discriminator()?,
            self.name(),
            &self.description().map(str::to_string),
        )?;
        Ok(Value::Object(out))
    }
}

/// Cartesian product of dimensions and registered subspaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDesignSpace {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub subspaces: Vec<Uuid>,
    pub dimensions: Vec<Dimension>,
}

impl ProductDesignSpace {
    const SUBSPACES: Property<Optional<ListOf<UuidCodec>>> =
        Property::optional("subspaces", "config.subspaces", ListOf(UuidCodec));
    const DIMENSIONS: Property<Optional<ListOf<Object<Dimension>>>> =
        Property::optional("dimensions", "config.dimensions", ListOf(Object::new()));

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            subspaces: Self::SUBSPACES.deserialize(data)?.unwrap_or_default(),
            dimensions: Self::DIMENSIONS.deserialize(data)?.unwrap_or_default(),
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        Self::SUBSPACES.serialize(&Some(self.subspaces.clone()), out)?;
        Self::DIMENSIONS.serialize(&Some(self.dimensions.clone()), out)
    }
}

/// An explicit list of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedDesignSpace {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub descriptors: Vec<Descriptor>,
    /// One mapping of descriptor key to value per candidate.
    pub data: Vec<BTreeMap<String, Value>>,
}

impl EnumeratedDesignSpace {
    const DESCRIPTORS: Property<ListOf<Object<Descriptor>>> =
        Property::new("descriptors", "config.descriptors", ListOf(Object::new()));
    const DATA: Property<ListOf<MappingOf<Json>>> = Property::new("data", "config.data", ListOf(MappingOf(Json)));

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            descriptors: Self::DESCRIPTORS.deserialize(data)?,
            data: Self::DATA.deserialize(data)?,
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        Self::DESCRIPTORS.serialize(&self.descriptors, out)?;
        Self::DATA.serialize(&self.data, out)
    }
}

/// Mixtures of a fixed ingredient set, subject to constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulationDesignSpace {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub formulation_descriptor: Descriptor,
    pub ingredients: Vec<String>,
    pub constraints: Vec<Value>,
    pub labels: Option<BTreeMap<String, Vec<String>>>,
    pub resolution: f64,
}

impl FormulationDesignSpace {
    const FORMULATION_DESCRIPTOR: Property<Object<Descriptor>> =
        Property::new("formulation_descriptor", "config.formulation_descriptor", Object::new());
    const INGREDIENTS: Property<SetOf<Str>> = Property::new("ingredients", "config.ingredients", SetOf(Str));
    const CONSTRAINTS: Property<SetOf<Json>> = Property::new("constraints", "config.constraints", SetOf(Json));
    const LABELS: Property<Optional<MappingOf<SetOf<Str>>>> =
        Property::optional("labels", "config.labels", MappingOf(SetOf(Str)));
    const RESOLUTION: Property<Float> = Property::new("resolution", "config.resolution", Float);

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            formulation_descriptor: Self::FORMULATION_DESCRIPTOR.deserialize(data)?,
            ingredients: Self::INGREDIENTS.deserialize(data)?,
            constraints: Self::CONSTRAINTS.deserialize(data)?,
            labels: Self::LABELS.deserialize(data)?,
            resolution: Self::RESOLUTION.deserialize(data)?,
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        Self::FORMULATION_DESCRIPTOR.serialize(&self.formulation_descriptor, out)?;
        Self::INGREDIENTS.serialize(&self.ingredients, out)?;
        Self::CONSTRAINTS.serialize(&self.constraints, out)?;
        Self::LABELS.serialize(&self.labels, out)?;
        Self::RESOLUTION.serialize(&self.resolution, out)
    }
}

/// Candidates taken from the rows of a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceDesignSpace {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub data_source: DataSource,
}

impl DataSourceDesignSpace {
    const DATA_SOURCE: Property<Polymorphic<DataSource>> =
        Property::new("data_source", "config.data_source", Polymorphic::new());

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            data_source: Self::DATA_SOURCE.deserialize(data)?,
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        Self::DATA_SOURCE.serialize(&self.data_source, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    #[rstest]
    fn test_deprecated_alias_dumps_canonical() {
        let data = json!({
            "config": {"type": "Univariate", "name": "legacy", "dimensions": []}
        });
        let space = DesignSpace::build(data).unwrap();
        assert_eq!(space.kind(), DesignSpaceKind::Product);
        assert_eq!(space.dump().unwrap()["config"]["type"], "ProductDesignSpace");
    }

    #[rstest]
    fn test_nested_data_source() {
        let data = json!({
            "config": {
                "type": "DataSourceDesignSpace",
                "name": "from table",
                "data_source": {
                    "type": "hosted_table_data_source",
                    "table_id": "5e2c6a1b-46e2-4a59-9a48-1ba8d3d3a7e4",
                    "table_version": 1
                }
            }
        });
        let DesignSpace::DataSource(space) = DesignSpace::build(data).unwrap() else {
            panic!("expected a data source design space")
        };
        assert!(matches!(space.data_source, DataSource::GemTable(_)));
    }

    fn enumerated(candidates: usize, descriptors: usize) -> DesignSpace {
        DesignSpace::Enumerated(EnumeratedDesignSpace {
            metadata: Default::default(),
            name: "enumerated".to_string(),
            description: None,
            descriptors: (0..descriptors)
                .map(|i| Descriptor::real(format!("x{i}"), 0.0, 1.0, ""))
                .collect(),
            data: vec![BTreeMap::new(); candidates],
        })
    }

    #[rstest]
    #[case(2000, 128, true)]
    #[case(2001, 128, false)]
    #[case(0, 1000, true)]
    fn test_cell_limit(#[case] candidates: usize, #[case] descriptors: usize, #[case] ok: bool) {
        assert_eq!(enumerated(candidates, descriptors).check_cell_limit().is_ok(), ok);
    }
}
