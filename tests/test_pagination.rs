mod common;

use citrine::{Catalog, PlatformClient};
use common::*;
use futures::TryStreamExt;
use rstest::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn project(name: &str) -> Value {
    json!({"id": uuid::Uuid::new_v4(), "name": name})
}

fn three_pages() -> Vec<Value> {
    vec![
        json!({"projects": [project("p1"), project("p2")], "next": "a"}),
        json!({"projects": [project("p3")], "next": "b"}),
        json!({"projects": [project("p4")], "next": ""}),
    ]
}

fn client(session: &Arc<FakeSession>) -> PlatformClient {
    PlatformClient::from_session(session.clone(), Arc::new(Catalog::empty()))
}

#[rstest]
#[tokio::test]
async fn test_follow_cursors() {
    let session = Arc::new(FakeSession::new(three_pages()));
    let projects = client(&session).projects();
    let names: Vec<String> = projects
        .list(None, Some(2))
        .map_ok(|p| p.name.clone())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(names, vec!["p1", "p2", "p3", "p4"]);

    let calls = session.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].path, "projects");
    assert_eq!(calls[0].param("per_page"), Some(json!(2)));
    assert_eq!(calls[1].path, "a");
    assert_eq!(calls[2].path, "b");
    for call in &calls[1..] {
        assert_eq!(call.param("per_page"), Some(json!(2)));
        assert_eq!(call.param("page"), None);
    }
}

#[rstest]
#[tokio::test]
async fn test_explicit_page_fetches_once() {
    let session = Arc::new(FakeSession::new(three_pages()));
    let projects = client(&session).projects();
    let items: Vec<_> = projects.list(Some(2), None).try_collect().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(session.call_count(), 1);
    assert_eq!(session.calls()[0].param("page"), Some(json!(2)));
}

#[rstest]
#[tokio::test]
async fn test_nothing_fetched_until_polled() {
    let session = Arc::new(FakeSession::new(three_pages()));
    let projects = client(&session).projects();
    let stream = projects.list(None, None);
    assert_eq!(session.call_count(), 0);
    drop(stream);
    assert_eq!(session.call_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_search_posts_params() {
    let session = Arc::new(FakeSession::new([json!({"projects": [project("Polymers")]})]));
    let projects = client(&session).projects();
    let params = json!({"name": {"value": "Poly", "search_method": "SUBSTRING"}});
    let found: Vec<_> = projects.search(params.clone(), Some(100)).try_collect().await.unwrap();
    assert_eq!(found.len(), 1);

    let call = &session.calls()[0];
    assert_eq!(call.method, "POST");
    assert_eq!(call.path, "projects/search");
    assert_eq!(call.body, Some(json!({ "search_params": params })));
}
