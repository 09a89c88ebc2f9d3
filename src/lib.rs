//! Client library for the Citrine materials informatics platform.
//!
//! Connect with [PlatformClient::builder], then walk from
//! [PlatformClient::projects] to the predictors, design spaces, processors,
//! modules and tables of a project. Module classes are compiled once from the
//! platform's schema catalog, see [informatics].

pub mod client;
pub mod collection;
pub mod errors;
pub mod informatics;
pub mod jobs;
pub mod models;
pub mod pagination;
pub mod resources;
pub mod serialization;
pub mod session;
pub mod types;

pub use client::{HttpSession, PlatformClient, PlatformClientBuilder};
pub use collection::{BuildContext, Collection, Linked, Resource};
pub use informatics::{compile_catalog, Catalog, InformaticsModule};
pub use jobs::PollingConfig;
pub use session::Session;
