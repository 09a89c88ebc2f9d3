//! Module classes compiled from the platform's schema catalog.
//!
//! The catalog is a list of JSON-Schema documents, one per registrable module.
//! [compile_catalog] merges their shared sub-schemas into one definition pool,
//! resolves every `$ref`, and produces an immutable [Catalog] of [ModuleClass]es
//! grouped by module type and indexed by schema id. Registrable classes are
//! instantiated as [InformaticsModule]s (an envelope around a validated
//! [ModuleInstance]); shared sub-schemas as bare [ModuleInstance]s.
//!
//! [codegen::render_module] turns a compiled catalog into Rust source with one
//! struct per class, for callers who prefer static types.

mod catalog;
mod class;
pub mod codegen;
mod compiler;
mod module;
mod names;
mod schema;

pub use catalog::*;
pub use class::*;
pub use compiler::*;
pub use module::*;
pub use names::pascalize;
pub use schema::*;
