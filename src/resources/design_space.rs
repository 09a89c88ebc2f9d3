use crate::collection::{BuildContext, Collection, Linked, Resource};
use crate::errors::{PlatformError, ResourceError};
use crate::jobs::HasStatus;
use crate::models::{DesignSpace, DESIGN_SPACE_MODULE_TYPE};
use crate::serialization::PolymorphicSerializable;
use crate::session::Session;
use serde_json::Value;
use shrinkwraprs::Shrinkwrap;
use std::sync::Arc;
use uuid::Uuid;

impl Resource for DesignSpace {
    fn build(data: Value, _context: &BuildContext) -> Result<Self, ResourceError> {
        <DesignSpace as PolymorphicSerializable>::build(data)
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        PolymorphicSerializable::dump(self)
    }

    fn uid(&self) -> Option<Uuid> {
        self.metadata().uid
    }
}

impl HasStatus for DesignSpace {
    fn status(&self) -> Option<&str> {
        self.metadata().status.as_deref()
    }
}

/// The design spaces of a project.
///
/// Design spaces are checked before they are sent: an enumerated design space
/// may hold at most [crate::models::ENUMERATED_CELL_LIMIT] values.
#[derive(Shrinkwrap, Clone)]
pub struct DesignSpaceCollection {
    #[shrinkwrap(main_field)]
    collection: Collection<DesignSpace>,
    project_id: Uuid,
}

impl DesignSpaceCollection {
    pub(crate) fn new(session: Arc<dyn Session>, project_id: Uuid, context: BuildContext) -> Self {
        Self {
            collection: Collection::modules(session, project_id, Some(DESIGN_SPACE_MODULE_TYPE), context),
            project_id,
        }
    }

    pub async fn register(&self, model: &DesignSpace) -> Result<Linked<DesignSpace>, PlatformError> {
        model.check_cell_limit()?;
        self.collection.register(model).await
    }

    pub async fn update(&self, model: &DesignSpace) -> Result<Linked<DesignSpace>, PlatformError> {
        model.check_cell_limit()?;
        self.collection.update(model).await
    }

    /// An unregistered design space covering every input of a predictor which
    /// is not also one of its outputs.
    pub async fn create_default(&self, predictor_id: Uuid) -> Result<Linked<DesignSpace>, PlatformError> {
        let path = format!("projects/{}/predictors/{}/default-design-space", self.project_id, predictor_id);
        let data = self.session().get_resource(&path, &vec![]).await?;
        self.build(data)
    }
}
