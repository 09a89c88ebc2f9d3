use crate::collection::{BuildContext, Collection, Linked, Resource};
use crate::errors::{JobError, PlatformError, ResourceError};
use crate::jobs::{poll_for_job_completion, JobSubmissionResponse, PollingConfig};
use crate::serialization::*;
use crate::session::Session;
use serde_json::{json, Map, Value};
use shrinkwraprs::Shrinkwrap;
use std::sync::Arc;
use uuid::Uuid;

/// One version of a GEM table: a tabular view of GEMD data.
#[derive(Debug, Clone, PartialEq)]
pub struct GemTable {
    pub uid: Option<Uuid>,
    pub version: Option<i64>,
    pub download_url: Option<String>,
}

const UID: Property<Optional<UuidCodec>> = Property::read_only("uid", "id", Optional(UuidCodec));
const VERSION: Property<Optional<Integer>> = Property::read_only("version", "version", Optional(Integer));
const DOWNLOAD_URL: Property<Optional<Str>> =
    Property::read_only("download_url", "signed_download_url", Optional(Str));

impl Resource for GemTable {
    fn build(data: Value, _context: &BuildContext) -> Result<Self, ResourceError> {
        Ok(Self {
            uid: UID.deserialize(&data)?,
            version: VERSION.deserialize(&data)?,
            download_url: DOWNLOAD_URL.deserialize(&data)?,
        })
    }

    /// Tables are built by the platform, never sent to it.
    fn dump(&self) -> Result<Value, ResourceError> {
        Ok(Value::Object(Map::new()))
    }

    fn uid(&self) -> Option<Uuid> {
        self.uid
    }
}

/// The GEM tables of a project.
#[derive(Shrinkwrap, Clone)]
pub struct GemTableCollection {
    #[shrinkwrap(main_field)]
    collection: Collection<GemTable>,
    project_id: Uuid,
}

impl GemTableCollection {
    pub(crate) fn new(session: Arc<dyn Session>, project_id: Uuid, context: BuildContext) -> Self {
        let path = format!("projects/{}/display-tables", project_id);
        Self {
            collection: Collection::new(session, path, context)
                .in_project(project_id)
                .keys(Some("table"), Some("tables")),
            project_id,
        }
    }

    /// Get one version of a table.
    pub async fn get_version(&self, uid: Uuid, version: i64) -> Result<Linked<GemTable>, PlatformError> {
        let path = format!("{}/versions/{}", self.item_path(uid), version);
        let data = self.session().get_resource(&path, &vec![]).await?;
        self.build(self.individual(data)?)
    }

    /// Build a table from a table configuration and wait for the result.
    pub async fn build_from_config(
        &self,
        config_id: Uuid,
        version: i64,
        config: &PollingConfig,
    ) -> Result<Linked<GemTable>, JobError> {
        let path = format!(
            "projects/{}/ara-definitions/{}/versions/{}/build",
            self.project_id, config_id, version
        );
        let response = self.session().post_resource(&path, &json!({}), &vec![]).await?;
        let job: JobSubmissionResponse = serde_json::from_value(response).map_err(PlatformError::from)?;
        log::info!("Building table from config {} version {} with job {}", config_id, version, job.job_id);

        let status = poll_for_job_completion(self.session().as_ref(), self.project_id, job.job_id, config).await?;
        let table_id = status
            .output("display_table_id")
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| missing_output("display_table_id"))?;
        let table_version = status
            .output("display_table_version")
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| missing_output("display_table_version"))?;
        Ok(self.get_version(table_id, table_version).await?)
    }
}

fn missing_output(key: &str) -> PlatformError {
    PlatformError::UnexpectedResponse(format!("table build job has no usable \"{}\" in its output", key))
}
