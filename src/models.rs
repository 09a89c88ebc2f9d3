//! Typed resources of the platform.

mod api_error;
mod data_sources;
mod descriptors;
mod design_spaces;
mod gemd;
mod metadata;
mod predictors;
mod processors;

pub use api_error::*;
pub use data_sources::*;
pub use descriptors::*;
pub use design_spaces::*;
pub use gemd::*;
pub use metadata::*;
pub use predictors::*;
pub use processors::*;
