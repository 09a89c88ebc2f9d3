use crate::collection::{BuildContext, Collection, Linked, Resource};
use crate::errors::{PlatformError, ResourceError};
use crate::jobs::HasStatus;
use crate::models::{DataSource, Predictor, PREDICTOR_MODULE_TYPE};
use crate::serialization::PolymorphicSerializable;
use crate::session::Session;
use crate::types::AutoConfigurePattern;
use serde_json::{json, Value};
use shrinkwraprs::Shrinkwrap;
use std::sync::Arc;
use uuid::Uuid;

impl Resource for Predictor {
    fn build(data: Value, _context: &BuildContext) -> Result<Self, ResourceError> {
        <Predictor as PolymorphicSerializable>::build(data)
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        PolymorphicSerializable::dump(self)
    }

    fn uid(&self) -> Option<Uuid> {
        self.metadata().uid
    }
}

impl HasStatus for Predictor {
    fn status(&self) -> Option<&str> {
        self.metadata().status.as_deref()
    }
}

/// The predictors of a project.
#[derive(Shrinkwrap, Clone)]
pub struct PredictorCollection {
    #[shrinkwrap(main_field)]
    collection: Collection<Predictor>,
    project_id: Uuid,
}

impl PredictorCollection {
    pub(crate) fn new(session: Arc<dyn Session>, project_id: Uuid, context: BuildContext) -> Self {
        Self {
            collection: Collection::modules(session, project_id, Some(PREDICTOR_MODULE_TYPE), context),
            project_id,
        }
    }

    /// The update available for a predictor, if there is one.
    ///
    /// Nothing is changed on the platform. Pass the result to
    /// [Collection::update] to apply it.
    pub async fn check_for_update(&self, predictor_id: Uuid) -> Result<Option<Predictor>, PlatformError> {
        let path = format!("projects/{}/predictors/{}/check-for-update", self.project_id, predictor_id);
        let data = self.session().get_resource(&path, &vec![]).await?;
        if !data.get("updatable").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(None);
        }
        let update = data
            .get("update")
            .cloned()
            .ok_or_else(|| PlatformError::UnexpectedResponse("updatable predictor has no \"update\"".to_string()))?;
        let name = update.get("name").cloned();
        let enveloped = json!({
            "id": predictor_id,
            "display_name": name,
            "module_type": PREDICTOR_MODULE_TYPE,
            "config": update,
        });
        Ok(Some(<Predictor as PolymorphicSerializable>::build(enveloped)?))
    }

    /// Ask the platform for an unregistered predictor configured for `training_data`.
    pub async fn auto_configure(
        &self,
        training_data: &DataSource,
        pattern: AutoConfigurePattern,
    ) -> Result<Linked<Predictor>, PlatformError> {
        let path = format!("projects/{}/predictors/default-predictor", self.project_id);
        let body = json!({
            "data_source": training_data.dump()?,
            "pattern": pattern,
        });
        let mut data = self.session().post_resource(&path, &body, &vec![]).await?;
        if let Some(instance) = data.as_object_mut().and_then(|d| d.remove("instance")) {
            data["config"] = instance;
        }
        self.build(data)
    }
}
