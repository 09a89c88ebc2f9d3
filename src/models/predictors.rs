//! Predictors: modules which compute material properties from other properties.

use crate::errors::{PropertyError, ResourceError};
use crate::models::metadata::{dump_module_header, DESCRIPTION, NAME};
use crate::models::{DataSource, Descriptor, ModuleMetadata};
use crate::serialization::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const PREDICTOR_MODULE_TYPE: &str = "PREDICTOR";

const TRAINING_DATA: Property<Optional<ListOf<Polymorphic<DataSource>>>> =
    Property::optional("training_data", "config.training_data", ListOf(Polymorphic::new()));
const INPUTS: Property<ListOf<Object<Descriptor>>> =
    Property::new("inputs", "config.inputs", ListOf(Object::new()));
const OUTPUT: Property<Object<Descriptor>> = Property::new("output", "config.output", Object::new());
const INPUT: Property<Object<Descriptor>> = Property::new("input_descriptor", "config.input", Object::new());
const EXPRESSION: Property<Str> = Property::new("expression", "config.expression", Str);

#[derive(Debug, Clone, PartialEq)]
pub enum Predictor {
    Simple(SimpleMLPredictor),
    Graph(GraphPredictor),
    Expression(ExpressionPredictor),
    DeprecatedExpression(DeprecatedExpressionPredictor),
    SimpleMixture(SimpleMixturePredictor),
    AutoML(AutoMLPredictor),
    MeanProperty(MeanPropertyPredictor),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PredictorKind {
    Simple,
    Graph,
    Expression,
    DeprecatedExpression,
    SimpleMixture,
    AutoML,
    MeanProperty,
}

macro_rules! each_predictor {
    ($value:expr, $p:ident => $body:expr) => {
        match $value {
            Predictor::Simple($p) => $body,
            Predictor::Graph($p) => $body,
            Predictor::Expression($p) => $body,
            Predictor::DeprecatedExpression($p) => $body,
            Predictor::SimpleMixture($p) => $body,
            Predictor::AutoML($p) => $body,
            Predictor::MeanProperty($p) => $body,
        }
    };
}

impl Predictor {
    pub fn name(&self) -> &str {
        each_predictor!(self, p => &p.name)
    }

    pub fn description(&self) -> Option<&str> {
        each_predictor!(self, p => p.description.as_deref())
    }

    pub fn metadata(&self) -> &ModuleMetadata {
        each_predictor!(self, p => &p.metadata)
    }

    pub fn uid(&self) -> Option<Uuid> {
        self.metadata().uid
    }
}

impl PolymorphicSerializable for Predictor {
    type Kind = PredictorKind;

    const TABLE: DiscriminatorTable<PredictorKind> = DiscriminatorTable {
        family: "predictor",
        path: "config.type",
        rows: &[
            ("Simple", PredictorKind::Simple, false),
            ("Graph", PredictorKind::Graph, false),
            ("AnalyticExpression", PredictorKind::Expression, false),
            ("Expression", PredictorKind::DeprecatedExpression, false),
            ("SimpleMixture", PredictorKind::SimpleMixture, false),
            ("AutoML", PredictorKind::AutoML, false),
            ("MeanProperty", PredictorKind::MeanProperty, false),
        ],
    };

    fn build(data: Value) -> Result<Self, ResourceError> {
        let d = &data;
        let predictor = match Self::get_type(d)? {
            PredictorKind::Simple => Predictor::Simple(SimpleMLPredictor::read(d)?),
            PredictorKind::Graph => Predictor::Graph(GraphPredictor::read(d)?),
            PredictorKind::Expression => Predictor::Expression(ExpressionPredictor::read(d)?),
            PredictorKind::DeprecatedExpression => {
                Predictor::DeprecatedExpression(DeprecatedExpressionPredictor::read(d)?)
            }
            PredictorKind::SimpleMixture => Predictor::SimpleMixture(SimpleMixturePredictor::read(d)?),
            PredictorKind::AutoML => Predictor::AutoML(AutoMLPredictor::read(d)?),
            PredictorKind::MeanProperty => Predictor::MeanProperty(MeanPropertyPredictor::read(d)?),
        };
        Ok(predictor)
    }

    fn kind(&self) -> PredictorKind {
        match self {
            Predictor::Simple(_) => PredictorKind::Simple,
            Predictor::Graph(_) => PredictorKind::Graph,
            Predictor::Expression(_) => PredictorKind::Expression,
            Predictor::DeprecatedExpression(_) => PredictorKind::DeprecatedExpression,
            Predictor::SimpleMixture(_) => PredictorKind::SimpleMixture,
            Predictor::AutoML(_) => PredictorKind::AutoML,
            Predictor::MeanProperty(_) => PredictorKind::MeanProperty,
        }
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        let mut out = Map::new();
        each_predictor!(self, p => p.write(&mut out))?;
        dump_module_header(
            &mut out,
            PREDICTOR_MODULE_TYPE,
            self.discriminator()?,
            self.name(),
            &self.description().map(str::to_string),
        )?;
        Ok(Value::Object(out))
    }
}

/// A machine-learned model mapping inputs to outputs, with optional latent variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleMLPredictor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub inputs: Vec<Descriptor>,
    pub outputs: Vec<Descriptor>,
    pub latent_variables: Vec<Descriptor>,
    pub training_data: Vec<DataSource>,
}

impl SimpleMLPredictor {
    const OUTPUTS: Property<ListOf<Object<Descriptor>>> =
        Property::new("outputs", "config.outputs", ListOf(Object::new()));
    const LATENT_VARIABLES: Property<ListOf<Object<Descriptor>>> =
        Property::new("latent_variables", "config.latent_variables", ListOf(Object::new()));

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            inputs: INPUTS.deserialize(data)?,
            outputs: Self::OUTPUTS.deserialize(data)?,
            latent_variables: Self::LATENT_VARIABLES.deserialize(data)?,
            training_data: TRAINING_DATA.deserialize(data)?.unwrap_or_default(),
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        INPUTS.serialize(&self.inputs, out)?;
        Self::OUTPUTS.serialize(&self.outputs, out)?;
        Self::LATENT_VARIABLES.serialize(&self.latent_variables, out)?;
        TRAINING_DATA.serialize(&Some(self.training_data.clone()), out)
    }
}

/// Composes registered predictors, referenced by id, into one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPredictor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub predictors: Vec<Uuid>,
    pub training_data: Vec<DataSource>,
}

impl GraphPredictor {
    const PREDICTORS: Property<ListOf<UuidCodec>> =
        Property::new("predictors", "config.predictors", ListOf(UuidCodec));

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            predictors: Self::PREDICTORS.deserialize(data)?,
            training_data: TRAINING_DATA.deserialize(data)?.unwrap_or_default(),
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        Self::PREDICTORS.serialize(&self.predictors, out)?;
        TRAINING_DATA.serialize(&Some(self.training_data.clone()), out)
    }
}

/// Computes an output from an analytic expression over aliased descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionPredictor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub expression: String,
    pub output: Descriptor,
    pub aliases: BTreeMap<String, Descriptor>,
}

impl ExpressionPredictor {
    const ALIASES: Property<MappingOf<Object<Descriptor>>> =
        Property::new("aliases", "config.aliases", MappingOf(Object::new()));

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            expression: EXPRESSION.deserialize(data)?,
            output: OUTPUT.deserialize(data)?,
            aliases: Self::ALIASES.deserialize(data)?,
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        EXPRESSION.serialize(&self.expression, out)?;
        OUTPUT.serialize(&self.output, out)?;
        Self::ALIASES.serialize(&self.aliases, out)
    }
}

/// The older expression predictor, whose aliases are plain descriptor keys.
#[derive(Debug, Clone, PartialEq)]
pub struct DeprecatedExpressionPredictor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub expression: String,
    pub output: Descriptor,
    pub aliases: BTreeMap<String, String>,
}

impl DeprecatedExpressionPredictor {
    const ALIASES: Property<MappingOf<Str>> = Property::new("aliases", "config.aliases", MappingOf(Str));

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            expression: EXPRESSION.deserialize(data)?,
            output: OUTPUT.deserialize(data)?,
            aliases: Self::ALIASES.deserialize(data)?,
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        EXPRESSION.serialize(&self.expression, out)?;
        OUTPUT.serialize(&self.output, out)?;
        Self::ALIASES.serialize(&self.aliases, out)
    }
}

/// Flattens a hierarchical formulation into a simple mixture of leaf ingredients.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleMixturePredictor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub input_descriptor: Descriptor,
    pub output_descriptor: Descriptor,
    pub training_data: Vec<DataSource>,
}

impl SimpleMixturePredictor {
    const OUTPUT_DESCRIPTOR: Property<Object<Descriptor>> =
        Property::new("output_descriptor", "config.output", Object::new());

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            input_descriptor: INPUT.deserialize(data)?,
            output_descriptor: Self::OUTPUT_DESCRIPTOR.deserialize(data)?,
            training_data: TRAINING_DATA.deserialize(data)?.unwrap_or_default(),
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        INPUT.serialize(&self.input_descriptor, out)?;
        Self::OUTPUT_DESCRIPTOR.serialize(&self.output_descriptor, out)?;
        TRAINING_DATA.serialize(&Some(self.training_data.clone()), out)
    }
}

/// A model whose architecture the platform selects automatically.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoMLPredictor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub inputs: Vec<Descriptor>,
    pub output: Descriptor,
    pub training_data: Vec<DataSource>,
}

impl AutoMLPredictor {
    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            inputs: INPUTS.deserialize(data)?,
            output: OUTPUT.deserialize(data)?,
            training_data: TRAINING_DATA.deserialize(data)?.unwrap_or_default(),
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        INPUTS.serialize(&self.inputs, out)?;
        OUTPUT.serialize(&self.output, out)?;
        TRAINING_DATA.serialize(&Some(self.training_data.clone()), out)
    }
}

/// Computes the p-norm mean of ingredient properties over a formulation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanPropertyPredictor {
    pub metadata: ModuleMetadata,
    pub name: String,
    pub description: Option<String>,
    pub input_descriptor: Descriptor,
    pub properties: Vec<Descriptor>,
    pub p: i64,
    pub impute_properties: bool,
    pub default_properties: Option<BTreeMap<String, Value>>,
    pub label: Option<String>,
    pub training_data: Vec<DataSource>,
}

impl MeanPropertyPredictor {
    const PROPERTIES: Property<ListOf<Object<Descriptor>>> =
        Property::new("properties", "config.properties", ListOf(Object::new()));
    const P: Property<Integer> = Property::new("p", "config.p", Integer);
    const IMPUTE_PROPERTIES: Property<Boolean> =
        Property::new("impute_properties", "config.impute_properties", Boolean);
    const DEFAULT_PROPERTIES: Property<Optional<MappingOf<Json>>> =
        Property::optional("default_properties", "config.default_properties", MappingOf(Json));
    const LABEL: Property<Optional<Str>> = Property::optional("label", "config.label", Str);

    fn read(data: &Value) -> Result<Self, PropertyError> {
        Ok(Self {
            metadata: ModuleMetadata::build(data)?,
            name: NAME.deserialize(data)?,
            description: DESCRIPTION.deserialize(data)?,
            input_descriptor: INPUT.deserialize(data)?,
            properties: Self::PROPERTIES.deserialize(data)?,
            p: Self::P.deserialize(data)?,
            impute_properties: Self::IMPUTE_PROPERTIES.deserialize(data)?,
            default_properties: Self::DEFAULT_PROPERTIES.deserialize(data)?,
            label: Self::LABEL.deserialize(data)?,
            training_data: TRAINING_DATA.deserialize(data)?.unwrap_or_default(),
        })
    }

    fn write(&self, out: &mut Map<String, Value>) -> Result<(), PropertyError> {
        INPUT.serialize(&self.input_descriptor, out)?;
        Self::PROPERTIES.serialize(&self.properties, out)?;
        Self::P.serialize(&self.p, out)?;
        Self::IMPUTE_PROPERTIES.serialize(&self.impute_properties, out)?;
        Self::DEFAULT_PROPERTIES.serialize(&self.default_properties, out)?;
        Self::LABEL.serialize(&self.label, out)?;
        TRAINING_DATA.serialize(&Some(self.training_data.clone()), out)
    }
}
