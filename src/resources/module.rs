use crate::collection::{BuildContext, Collection, Resource};
use crate::errors::{ResourceError, ValidationError};
use crate::informatics::InformaticsModule;
use crate::session::Session;
use serde_json::{Map, Value};
use shrinkwraprs::Shrinkwrap;
use std::sync::Arc;
use uuid::Uuid;

impl Resource for InformaticsModule {
    /// Dispatch on `schema_id` through the catalog.
    fn build(data: Value, context: &BuildContext) -> Result<Self, ResourceError> {
        context.catalog.build_module(&data)
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        InformaticsModule::dump(self)
    }

    fn uid(&self) -> Option<Uuid> {
        self.uid
    }
}

/// Catalog-backed modules of any type.
#[derive(Shrinkwrap, Clone)]
pub struct ModuleCollection(Collection<InformaticsModule>);

impl ModuleCollection {
    pub(crate) fn new(session: Arc<dyn Session>, project_id: Uuid, context: BuildContext) -> Self {
        Self(Collection::modules(session, project_id, None, context))
    }

    /// Construct an unregistered module of the class `name` in `bucket`.
    pub fn create(&self, bucket: &str, name: &str, kwargs: Map<String, Value>) -> Result<InformaticsModule, ValidationError> {
        self.context().catalog.module(bucket, name, kwargs)
    }
}
