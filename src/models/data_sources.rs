use crate::errors::ResourceError;
use crate::models::Descriptor;
use crate::serialization::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Link to a file stored on the platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileLink {
    pub filename: String,
    pub url: String,
}

/// Where a predictor or design space reads its training data from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv(CsvDataSource),
    GemTable(GemTableDataSource),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataSourceKind {
    Csv,
    GemTable,
}

/// A CSV file, with column headers mapped to descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDataSource {
    pub file_link: FileLink,
    pub column_definitions: BTreeMap<String, Descriptor>,
    pub identifiers: Option<Vec<String>>,
}

impl CsvDataSource {
    const FILE_LINK: Property<Object<FileLink>> = Property::new("file_link", "file_link", Object::new());
    const COLUMN_DEFINITIONS: Property<MappingOf<Object<Descriptor>>> =
        Property::new("column_definitions", "column_definitions", MappingOf(Object::new()));
    const IDENTIFIERS: Property<Optional<ListOf<Str>>> =
        Property::optional("identifiers", "identifiers", ListOf(Str));
}

/// A GEM table hosted on the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct GemTableDataSource {
    pub table_id: Uuid,
    pub table_version: i64,
    pub formulation_descriptor: Option<Descriptor>,
}

impl GemTableDataSource {
    const TABLE_ID: Property<UuidCodec> = Property::new("table_id", "table_id", UuidCodec);
    const TABLE_VERSION: Property<Integer> = Property::new("table_version", "table_version", Integer);
    const FORMULATION_DESCRIPTOR: Property<Optional<Object<Descriptor>>> =
        Property::optional("formulation_descriptor", "formulation_descriptor", Object::new());
}

const TYPE: Property<Str> = Property::write_only("typ", "type", Str);

impl PolymorphicSerializable for DataSource {
    type Kind = DataSourceKind;

    const TABLE: DiscriminatorTable<DataSourceKind> = DiscriminatorTable {
        family: "data source",
        path: "type",
        rows: &[
            ("csv_data_source", DataSourceKind::Csv, false),
            ("hosted_table_data_source", DataSourceKind::GemTable, false),
        ],
    };

    fn build(data: Value) -> Result<Self, ResourceError> {
        let source = match Self::get_type(&data)? {
            DataSourceKind::Csv => DataSource::Csv(CsvDataSource {
                file_link: CsvDataSource::FILE_LINK.deserialize(&data)?,
                column_definitions: CsvDataSource::COLUMN_DEFINITIONS.deserialize(&data)?,
                identifiers: CsvDataSource::IDENTIFIERS.deserialize(&data)?,
            }),
            DataSourceKind::GemTable => DataSource::GemTable(GemTableDataSource {
                table_id: GemTableDataSource::TABLE_ID.deserialize(&data)?,
                table_version: GemTableDataSource::TABLE_VERSION.deserialize(&data)?,
                formulation_descriptor: GemTableDataSource::FORMULATION_DESCRIPTOR.deserialize(&data)?,
            }),
        };
        Ok(source)
    }

    fn kind(&self) -> DataSourceKind {
        match self {
            DataSource::Csv(_) => DataSourceKind::Csv,
            DataSource::GemTable(_) => DataSourceKind::GemTable,
        }
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        let mut out = Map::new();
        TYPE.serialize(&self.discriminator()?.to_string(), &mut out)?;
        match self {
            DataSource::Csv(s) => {
                CsvDataSource::FILE_LINK.serialize(&s.file_link, &mut out)?;
                CsvDataSource::COLUMN_DEFINITIONS.serialize(&s.column_definitions, &mut out)?;
                CsvDataSource::IDENTIFIERS.serialize(&s.identifiers, &mut out)?;
            }
            DataSource::GemTable(s) => {
                GemTableDataSource::TABLE_ID.serialize(&s.table_id, &mut out)?;
                GemTableDataSource::TABLE_VERSION.serialize(&s.table_version, &mut out)?;
                GemTableDataSource::FORMULATION_DESCRIPTOR.serialize(&s.formulation_descriptor, &mut out)?;
            }
        }
        Ok(Value::Object(out))
    }
}

impl Serialize for DataSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.dump()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DataSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = Value::deserialize(deserializer)?;
        DataSource::build(data).map_err(serde::de::Error::custom)
    }
}
