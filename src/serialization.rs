//! Declarative mapping between typed fields and nested JSON paths.

mod polymorphic;
mod properties;

pub use polymorphic::*;
pub use properties::*;
