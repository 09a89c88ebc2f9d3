use serde::{Deserialize, Serialize};

/// Describes a material property or attribute which predictors read and write.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Descriptor {
    Real(RealDescriptor),
    Integer(IntegerDescriptor),
    Categorical(CategoricalDescriptor),
    Formulation(KeyOnly),
    /// Inorganic chemical formula.
    Inorganic(KeyOnly),
    /// Molecular structure, e.g. SMILES.
    Organic(KeyOnly),
}

impl Descriptor {
    pub fn key(&self) -> &str {
        match self {
            Descriptor::Real(d) => &d.key,
            Descriptor::Integer(d) => &d.key,
            Descriptor::Categorical(d) => &d.key,
            Descriptor::Formulation(d) | Descriptor::Inorganic(d) | Descriptor::Organic(d) => {
                &d.key
            }
        }
    }

    pub fn real(key: impl Into<String>, lower_bound: f64, upper_bound: f64, units: impl Into<String>) -> Self {
        Descriptor::Real(RealDescriptor {
            key: key.into(),
            lower_bound,
            upper_bound,
            units: units.into(),
        })
    }

    pub fn formulation(key: impl Into<String>) -> Self {
        Descriptor::Formulation(KeyOnly { key: key.into() })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RealDescriptor {
    #[serde(rename = "descriptor_key")]
    pub key: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    #[serde(default)]
    pub units: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IntegerDescriptor {
    #[serde(rename = "descriptor_key")]
    pub key: String,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoricalDescriptor {
    #[serde(rename = "descriptor_key")]
    pub key: String,
    #[serde(rename = "descriptor_values")]
    pub categories: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyOnly {
    #[serde(rename = "descriptor_key")]
    pub key: String,
}

/// One axis of a product design space.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Dimension {
    #[serde(rename = "ContinuousDimension")]
    Continuous {
        descriptor: Descriptor,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[serde(rename = "EnumeratedDimension")]
    Enumerated {
        descriptor: Descriptor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template_id: Option<uuid::Uuid>,
        #[serde(rename = "list")]
        values: Vec<String>,
    },
}
