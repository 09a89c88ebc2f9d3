use crate::collection::{BuildContext, Collection, Resource};
use crate::errors::ResourceError;
use crate::jobs::HasStatus;
use crate::models::{Processor, PROCESSOR_MODULE_TYPE};
use crate::serialization::PolymorphicSerializable;
use crate::session::Session;
use serde_json::Value;
use shrinkwraprs::Shrinkwrap;
use std::sync::Arc;
use uuid::Uuid;

impl Resource for Processor {
    fn build(data: Value, _context: &BuildContext) -> Result<Self, ResourceError> {
        <Processor as PolymorphicSerializable>::build(data)
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        PolymorphicSerializable::dump(self)
    }

    fn uid(&self) -> Option<Uuid> {
        self.metadata().uid
    }
}

impl HasStatus for Processor {
    fn status(&self) -> Option<&str> {
        self.metadata().status.as_deref()
    }
}

/// The processors of a project.
#[derive(Shrinkwrap, Clone)]
pub struct ProcessorCollection(Collection<Processor>);

impl ProcessorCollection {
    pub(crate) fn new(session: Arc<dyn Session>, project_id: Uuid, context: BuildContext) -> Self {
        Self(Collection::modules(
            session,
            project_id,
            Some(PROCESSOR_MODULE_TYPE),
            context,
        ))
    }
}
