//! Batch deletion of GEMD objects.

use crate::errors::{DeleteError, PlatformError};
use crate::jobs::{poll_for_job_completion, JobSubmissionResponse, PollingConfig};
use crate::models::{DeleteFailure, GemdEntity, LinkByUid};
use crate::session::Session;
use itertools::Itertools;
use serde::Deserialize;
use serde_json::{json, Value};
use serde_with::json::JsonString;
use serde_with::serde_as;
use std::cmp::Reverse;
use uuid::Uuid;

/// Most objects the synchronous endpoint accepts in one request.
pub const DELETE_SERVICE_MAX: usize = 50;

/// Something which identifies a GEMD object to delete.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Link(LinkByUid),
    /// A platform id.
    Uid(Uuid),
    /// A platform id which has not been parsed yet.
    Str(String),
    Entity(GemdEntity),
}

impl From<LinkByUid> for DeleteTarget {
    fn from(value: LinkByUid) -> Self {
        DeleteTarget::Link(value)
    }
}

impl From<Uuid> for DeleteTarget {
    fn from(value: Uuid) -> Self {
        DeleteTarget::Uid(value)
    }
}

impl From<&str> for DeleteTarget {
    fn from(value: &str) -> Self {
        DeleteTarget::Str(value.to_string())
    }
}

impl From<GemdEntity> for DeleteTarget {
    fn from(value: GemdEntity) -> Self {
        DeleteTarget::Entity(value)
    }
}

impl DeleteTarget {
    fn scoped(&self) -> Result<LinkByUid, DeleteError> {
        match self {
            DeleteTarget::Link(link) => Ok(link.clone()),
            DeleteTarget::Uid(uid) => Ok(LinkByUid::platform(*uid)),
            DeleteTarget::Str(s) => Uuid::parse_str(s)
                .map(LinkByUid::platform)
                .map_err(|_| DeleteError::NotAUuid(s.clone())),
            DeleteTarget::Entity(entity) => LinkByUid::from_entity(entity)
                .ok_or_else(|| DeleteError::MissingUid(format!("{:?}", entity.entity_type))),
        }
    }
}

fn request_body(ids: &[LinkByUid], dataset_id: Option<Uuid>) -> Value {
    let mut body = json!({ "ids": ids });
    if let Some(dataset_id) = dataset_id {
        body["dataset_id"] = json!(dataset_id.to_string());
    }
    body
}

/// Output of an asynchronous delete job. Failures arrive as a JSON-encoded string.
#[serde_as]
#[derive(Deserialize)]
struct AsyncDeleteOutput {
    #[serde_as(as = "JsonString")]
    #[serde(default)]
    failures: Vec<DeleteFailure>,
}

fn failures(value: Value) -> Result<Vec<DeleteFailure>, PlatformError> {
    match value {
        Value::Null => Ok(Vec::new()),
        value => Ok(serde_json::from_value(value)?),
    }
}

/// Remove GEMD objects, referrers before what they refer to.
///
/// More than [DELETE_SERVICE_MAX] objects may only be deleted when every
/// target is a full [GemdEntity], so that they can be put into a safe
/// order. That check happens before any request is made. Large batches are
/// sent in chunks and the failures of every chunk are returned.
///
/// Attribute templates cannot be removed this way, see [async_gemd_batch_delete].
pub async fn gemd_batch_delete(
    session: &dyn Session,
    project_id: Uuid,
    targets: Vec<DeleteTarget>,
    dataset_id: Option<Uuid>,
) -> Result<Vec<DeleteFailure>, DeleteError> {
    let targets = if targets.len() > DELETE_SERVICE_MAX {
        if targets.iter().any(|t| !matches!(t, DeleteTarget::Entity(_))) {
            return Err(DeleteError::EntitiesRequired {
                limit: DELETE_SERVICE_MAX,
                count: targets.len(),
            });
        }
        targets
            .into_iter()
            .sorted_by_key(|t| match t {
                DeleteTarget::Entity(e) => Reverse(e.entity_type.writable_sort_order()),
                _ => Reverse(0),
            })
            .collect()
    } else {
        targets
    };
    let scoped = targets.iter().map(DeleteTarget::scoped).collect::<Result<Vec<_>, _>>()?;

    let path = format!("projects/{}/gemd/batch-delete", project_id);
    let mut all_failures = Vec::new();
    for chunk in scoped.chunks(DELETE_SERVICE_MAX) {
        let response = session
            .post_resource(&path, &request_body(chunk, dataset_id), &vec![])
            .await?;
        let chunk_failures = response.get("failures").cloned().unwrap_or(Value::Null);
        all_failures.extend(failures(chunk_failures)?);
    }
    Ok(all_failures)
}

/// Remove GEMD objects with a platform job, waiting for it to finish.
///
/// Unlike [gemd_batch_delete] there is no size limit, and attribute templates
/// can be removed. Only [LinkByUid]s and platform ids are accepted.
pub async fn async_gemd_batch_delete(
    session: &dyn Session,
    project_id: Uuid,
    targets: Vec<DeleteTarget>,
    dataset_id: Option<Uuid>,
    config: &PollingConfig,
) -> Result<Vec<DeleteFailure>, DeleteError> {
    let scoped = targets
        .iter()
        .map(|t| match t {
            DeleteTarget::Link(_) | DeleteTarget::Uid(_) => t.scoped(),
            _ => Err(DeleteError::Unsupported(
                "asynchronous deletes accept only LinkByUid or UUID entries",
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let path = format!("projects/{}/gemd/async-batch-delete", project_id);
    let response = session
        .post_resource(&path, &request_body(&scoped, dataset_id), &vec![])
        .await?;
    let job: JobSubmissionResponse = serde_json::from_value(response).map_err(PlatformError::from)?;
    let status = poll_for_job_completion(session, project_id, job.job_id, config).await?;
    let output = serde_json::to_value(status.output.unwrap_or_default()).map_err(PlatformError::from)?;
    let output: AsyncDeleteOutput = serde_json::from_value(output).map_err(PlatformError::from)?;
    Ok(output.failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;
    use rstest::*;

    #[rstest]
    #[case(DeleteTarget::Uid(Uuid::nil()), LinkByUid::new("id", Uuid::nil().to_string()))]
    #[case(DeleteTarget::from("00000000-0000-0000-0000-000000000000"), LinkByUid::new("id", Uuid::nil().to_string()))]
    #[case(DeleteTarget::from(LinkByUid::new("lab", "x1")), LinkByUid::new("lab", "x1"))]
    #[case(
        DeleteTarget::from(GemdEntity::new(EntityType::MaterialRun).with_uid("lab", "x1").with_uid("auto", "a1")),
        LinkByUid::new("auto", "a1")
    )]
    fn test_scoped(#[case] target: DeleteTarget, #[case] expected: LinkByUid) {
        assert_eq!(target.scoped().unwrap(), expected);
    }

    #[rstest]
    fn test_not_a_uuid() {
        assert!(matches!(
            DeleteTarget::from("sample-7").scoped(),
            Err(DeleteError::NotAUuid(s)) if s == "sample-7"
        ));
    }

    #[rstest]
    fn test_request_body() {
        let body = request_body(&[LinkByUid::new("lab", "x1")], Some(Uuid::nil()));
        assert_eq!(
            body,
            json!({
                "ids": [{"scope": "lab", "id": "x1"}],
                "dataset_id": "00000000-0000-0000-0000-000000000000"
            })
        );
    }
}
