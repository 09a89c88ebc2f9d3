mod common;

use citrine::errors::DeleteError;
use citrine::jobs::PollingConfig;
use citrine::models::{EntityType, GemdEntity, LinkByUid};
use citrine::resources::{async_gemd_batch_delete, gemd_batch_delete, DeleteTarget, DELETE_SERVICE_MAX};
use common::*;
use rstest::*;
use serde_json::json;
use uuid::Uuid;

#[fixture]
fn project_id() -> Uuid {
    Uuid::parse_str(PROJECT_ID).unwrap()
}

fn uids(n: usize) -> Vec<DeleteTarget> {
    (0..n).map(|_| DeleteTarget::Uid(Uuid::new_v4())).collect()
}

#[rstest]
#[tokio::test]
async fn test_too_many_identifiers_fails_before_request(project_id: Uuid) {
    let session = FakeSession::new([json!({"failures": []})]);
    let err = gemd_batch_delete(&session, project_id, uids(DELETE_SERVICE_MAX + 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DeleteError::EntitiesRequired { limit: 50, count: 51 }));
    assert_eq!(session.call_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_at_limit_is_one_request(project_id: Uuid) {
    let session = FakeSession::new([json!({"failures": []})]);
    let mut targets = uids(DELETE_SERVICE_MAX - 3);
    targets.push(LinkByUid::new("lab", "x1").into());
    targets.push(Uuid::nil().to_string().as_str().into());
    targets.push(GemdEntity::new(EntityType::ProcessSpec).with_uid("lab", "p1").into());
    let failures = gemd_batch_delete(&session, project_id, targets, None).await.unwrap();
    assert!(failures.is_empty());

    let calls = session.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, format!("projects/{}/gemd/batch-delete", project_id));
    let ids = calls[0].body.as_ref().unwrap()["ids"].as_array().unwrap().clone();
    assert_eq!(ids.len(), DELETE_SERVICE_MAX);
    assert_eq!(ids[47], json!({"scope": "lab", "id": "x1"}));
}

#[rstest]
#[tokio::test]
async fn test_large_batches_are_ordered_and_chunked(project_id: Uuid) {
    let failure = json!({
        "id": {"scope": "lab", "id": "t0"},
        "cause": {"code": 400, "message": "referenced", "validation_errors": []}
    });
    let session = FakeSession::new([json!({"failures": [failure]}), json!({"failures": []})]);
    let mut targets: Vec<DeleteTarget> = (0..30)
        .map(|i| GemdEntity::new(EntityType::PropertyTemplate).with_uid("lab", format!("t{}", i)).into())
        .collect();
    targets.extend(
        (0..30).map(|i| DeleteTarget::from(GemdEntity::new(EntityType::MaterialRun).with_uid("lab", format!("r{}", i)))),
    );
    let failures = gemd_batch_delete(&session, project_id, targets, Some(Uuid::nil()))
        .await
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].id, LinkByUid::new("lab", "t0"));
    assert_eq!(failures[0].cause.message.as_deref(), Some("referenced"));

    let calls = session.calls();
    assert_eq!(calls.len(), 2);
    let first = calls[0].body.as_ref().unwrap();
    assert_eq!(first["ids"][0]["id"], "r0");
    assert_eq!(first["dataset_id"], Uuid::nil().to_string());
    assert_eq!(calls[1].body.as_ref().unwrap()["ids"].as_array().unwrap().len(), 10);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_async_delete_sends_every_uuid(project_id: Uuid) {
    let failures = json!([{"id": {"scope": "id", "id": "abc"}, "cause": {"message": "in use"}}]).to_string();
    let session = FakeSession::new([
        json!({"job_id": Uuid::new_v4()}),
        job_status("Running", vec![]),
        json!({"job_type": "delete", "status": "Success", "tasks": [], "output": {"failures": failures}}),
    ]);
    let targets = vec![
        DeleteTarget::Uid(Uuid::new_v4()),
        DeleteTarget::Uid(Uuid::new_v4()),
        LinkByUid::new("lab", "x1").into(),
    ];
    let result = async_gemd_batch_delete(&session, project_id, targets, None, &PollingConfig::batch_delete())
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].cause.message.as_deref(), Some("in use"));

    let calls = session.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].path, format!("projects/{}/gemd/async-batch-delete", project_id));
    assert_eq!(calls[0].body.as_ref().unwrap()["ids"].as_array().unwrap().len(), 3);
}

#[rstest]
#[tokio::test]
async fn test_async_delete_rejects_entities(project_id: Uuid) {
    let session = FakeSession::new([json!({"job_id": Uuid::new_v4()})]);
    let targets = vec![GemdEntity::new(EntityType::MaterialRun).with_uid("lab", "r").into()];
    let err = async_gemd_batch_delete(&session, project_id, targets, None, &PollingConfig::batch_delete())
        .await
        .unwrap_err();
    assert!(matches!(err, DeleteError::Unsupported(_)));
    assert_eq!(session.call_count(), 0);
}
