//! Platform resources and the collections which hold them.

mod delete;
mod design_space;
mod gemtable;
mod module;
mod predictor;
mod processor;
mod project;

pub use delete::*;
pub use design_space::*;
pub use gemtable::*;
pub use module::*;
pub use predictor::*;
pub use processor::*;
pub use project::*;
