use crate::collection::{BuildContext, Collection, Linked, Resource};
use crate::errors::{DeleteError, PlatformError, ResourceError};
use crate::jobs::PollingConfig;
use crate::models::DeleteFailure;
use crate::resources::{
    async_gemd_batch_delete, DeleteTarget, DesignSpaceCollection, GemTableCollection, ModuleCollection,
    PredictorCollection, ProcessorCollection,
};
use crate::serialization::*;
use crate::session::Session;
use futures::Stream;
use serde_json::{json, Map, Value};
use shrinkwraprs::Shrinkwrap;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// A project: the unit which owns modules, tables and data.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub uid: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<OffsetDateTime>,
}

impl Project {
    const NAME: Property<Str> = Property::new("name", "name", Str);
    const DESCRIPTION: Property<Optional<Str>> = Property::optional("description", "description", Str);
    const UID: Property<Optional<UuidCodec>> = Property::read_only("uid", "id", Optional(UuidCodec));
    const STATUS: Property<Optional<Str>> = Property::read_only("status", "status", Optional(Str));
    const CREATED_AT: Property<Optional<Datetime>> =
        Property::read_only("created_at", "created_at", Optional(Datetime));

    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            uid: None,
            name: name.into(),
            description,
            status: None,
            created_at: None,
        }
    }
}

impl Resource for Project {
    fn build(data: Value, _context: &BuildContext) -> Result<Self, ResourceError> {
        Ok(Self {
            uid: Self::UID.deserialize(&data)?,
            name: Self::NAME.deserialize(&data)?,
            description: Self::DESCRIPTION.deserialize(&data)?,
            status: Self::STATUS.deserialize(&data)?,
            created_at: Self::CREATED_AT.deserialize(&data)?,
        })
    }

    fn dump(&self) -> Result<Value, ResourceError> {
        let mut out = Map::new();
        Self::NAME.serialize(&self.name, &mut out)?;
        Self::DESCRIPTION.serialize(&self.description, &mut out)?;
        Ok(Value::Object(out))
    }

    fn uid(&self) -> Option<Uuid> {
        self.uid
    }
}

/// Every project visible to the user.
#[derive(Shrinkwrap, Clone)]
pub struct ProjectCollection(Collection<Project>);

impl ProjectCollection {
    pub(crate) fn new(session: Arc<dyn Session>, context: BuildContext) -> Self {
        Self(Collection::new(session, "projects", context).keys(Some("project"), Some("projects")))
    }

    /// Create a new project.
    pub async fn register(&self, name: &str, description: Option<&str>) -> Result<Linked<Project>, PlatformError> {
        let project = Project::new(name, description.map(str::to_string));
        self.0.register(&project).await
    }

    /// Projects whose fields match `search_params`, e.g.
    /// `{"name": {"value": "Polymers", "search_method": "SUBSTRING"}}`.
    pub fn search(
        &self,
        search_params: Value,
        per_page: Option<u32>,
    ) -> impl Stream<Item = Result<Linked<Project>, PlatformError>> + '_ {
        self.0.search(json!({ "search_params": search_params }), None, per_page)
    }
}

impl Linked<Project> {
    fn project_uid(&self) -> Result<Uuid, PlatformError> {
        self.object.uid.ok_or_else(|| {
            PlatformError::UnexpectedResponse(format!("project \"{}\" has no id", self.object.name))
        })
    }

    pub fn predictors(&self) -> Result<PredictorCollection, PlatformError> {
        Ok(PredictorCollection::new(
            Arc::clone(&self.session),
            self.project_uid()?,
            self.context.clone(),
        ))
    }

    pub fn design_spaces(&self) -> Result<DesignSpaceCollection, PlatformError> {
        Ok(DesignSpaceCollection::new(
            Arc::clone(&self.session),
            self.project_uid()?,
            self.context.clone(),
        ))
    }

    pub fn processors(&self) -> Result<ProcessorCollection, PlatformError> {
        Ok(ProcessorCollection::new(
            Arc::clone(&self.session),
            self.project_uid()?,
            self.context.clone(),
        ))
    }

    /// Modules of every type, built through the module catalog.
    pub fn modules(&self) -> Result<ModuleCollection, PlatformError> {
        Ok(ModuleCollection::new(
            Arc::clone(&self.session),
            self.project_uid()?,
            self.context.clone(),
        ))
    }

    pub fn tables(&self) -> Result<GemTableCollection, PlatformError> {
        Ok(GemTableCollection::new(
            Arc::clone(&self.session),
            self.project_uid()?,
            self.context.clone(),
        ))
    }

    /// Remove a set of GEMD objects with a platform job.
    ///
    /// Objects which could not be deleted are returned, not raised.
    pub async fn gemd_batch_delete(
        &self,
        ids: Vec<DeleteTarget>,
        config: &PollingConfig,
    ) -> Result<Vec<DeleteFailure>, DeleteError> {
        let project_id = self.project_uid()?;
        async_gemd_batch_delete(self.session.as_ref(), project_id, ids, None, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::informatics::Catalog;

    #[test]
    fn test_project_round_trip() {
        let context = BuildContext::new(Arc::new(Catalog::empty()));
        let data = json!({
            "id": "6b608f78-e341-422c-8076-35adc8828545",
            "name": "Polymers",
            "description": "chain length",
            "status": "CREATED",
            "created_at": 1_559_933_807_392i64
        });
        let project = Project::build(data, &context).unwrap();
        assert_eq!(project.name, "Polymers");
        assert_eq!(project.status.as_deref(), Some("CREATED"));
        assert!(project.created_at.is_some());
        assert_eq!(
            project.dump().unwrap(),
            json!({"name": "Polymers", "description": "chain length"})
        );
    }

    #[test]
    fn test_unique_paths() {
        assert_unique_paths(&[
            &Project::NAME.path,
            &Project::DESCRIPTION.path,
            &Project::UID.path,
            &Project::STATUS.path,
            &Project::CREATED_AT.path,
        ]);
    }
}
