//! Processors: strategies for searching a design space.

use crate::errors::{PropertyError, ResourceError};
use crate::models::metadata::{dump_module_header, DESCRIPTION, NAME};
use crate::models::ModuleMetadata;
use crate::serialization::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const PROCESSOR_MODULE_TYPE: &str = "PROCESSOR";

#[derive(Debug, Clone, PartialEq)]
pub enum Processor {
    Grid(GridProcessor),
    Enumerated(EnumeratedProcessor),
    MonteCarlo(MonteCarloProcessor),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProcessorKind {
    Grid,
    Enumerated,
    MonteCarlo,
}

/// Grid search over continuous dimensions, with a number of points per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct GridProcessor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub grid_sizes: BTreeMap<String, i64>,
}

/// Exhaustive search over at most `max_candidates` candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedProcessor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub max_candidates: i64,
}

/// Random sampling search.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloProcessor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub max_candidates: Option<i64>,
}

const GRID_SIZES: Property<MappingOf<Integer>> =
    Property::new("grid_sizes", "config.grid_dimensions", MappingOf(Integer));
const MAX_SIZE: Property<Integer> = Property::new("max_candidates", "config.max_size", Integer);
const MAX_CANDIDATES: Property<Optional<Integer>> =
    Property::optional("max_candidates", "config.max_candidates", Integer);

impl Processor {
    pub fn name(&self) -> &str {
        match self {
            Processor::Grid(p) => &p.name,
            Processor::Enumerated(p) => &p.name,
            Processor::MonteCarlo(p) => &p.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Processor::Grid(p) => p.description.as_deref(),
            Processor::Enumerated(p) => p.description.as_deref(),
            Processor::MonteCarlo(p) => p.description.as_deref(),
        }
    }

    pub fn metadata(&self) -> &ModuleMetadata {
        match self {
            Processor::Grid(p) => &p.metadata,
            Processor::Enumerated(p) => &p.metadata,
            Processor::MonteCarlo(p) => &p.metadata,
        }
    }

    pub fn uid(&self) -> Option<Uuid> {
        self.metadata().uid
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        match self {
            Processor::Grid(p) => GRID_SIZES.serialize(&p.grid_sizes, out),
            Processor::Enumerated(p) => MAX_SIZE.serialize(&p.max_candidates, out),
            Processor::MonteCarlo(p) => MAX_CANDIDATES.serialize(&p.max_candidates, out),
        }
    }
}

impl PolymorphicSerializable for Processor {
    type Kind = ProcessorKind;

    const TABLE: DiscriminatorTable<ProcessorKind> = DiscriminatorTable {
        family: "processor",
        path: "config.type",
        rows: &[
            ("Grid", ProcessorKind::Grid, false),
            ("Enumerated", ProcessorKind::Enumerated, false),
            ("ContinuousSearch", ProcessorKind::MonteCarlo, false),
        ],
    };

    fn build(data: Value) -> Result<Self, ResourceError> {
        let kind = Self::get_type(&data)?;
        let metadata = ModuleMetadata::build(&data)?;
        let name = NAME.deserialize(&data)?;
        let description = DESCRIPTION.deserialize(&data)?;
        let processor = match kind {
            ProcessorKind::Grid => Processor::Grid(GridProcessor {
                metadata,
                name,
                description,
                grid_sizes: GRID_SIZES.deserialize(&data)?,
            }),
            ProcessorKind::Enumerated => Processor::Enumerated(EnumeratedProcessor {
                metadata,
                name,
                description,
                max_candidates: MAX_SIZE.deserialize(&data)?,
            }),
            ProcessorKind::MonteCarlo => Processor::MonteCarlo(MonteCarloProcessor {
                metadata,
                name,
                description,
                max_candidates: MAX_CANDIDATES.deserialize(&data)?,
            }),
        };
        Ok(processor)
    }

    fn kind(&self) -> ProcessorKind {
        match self {
            Processor::Grid(_) => ProcessorKind::Grid,
            Processor::Enumerated(_) => ProcessorKind::Enumerated,
            Processor::MonteCarlo(_) => ProcessorKind::MonteCarlo,
        }
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        let mut out = Map::new();
        self.write(&mut out)?;
        dump_module_header(
            &mut out,
            PROCESSOR_MODULE_TYPE,
            self.discriminator()?,
            self.name(),
            &self.description().map(str::to_string),
        )?;
        Ok(Value::Object(out))
    }
}
