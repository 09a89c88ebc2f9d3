//! Lazily walking paged collections.

use crate::errors::PlatformError;
use async_stream::try_stream;
use futures::Stream;
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;

/// One fetched page of raw items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Where to find the next page. Absent or empty on the final page.
    pub next: Option<String>,
}

impl Page<Value> {
    /// Split a page response into its items and its `next` link.
    ///
    /// Items are found under `collection_key`, or the response is itself the
    /// list of items when there is no key.
    pub fn from_response(data: Value, collection_key: Option<&str>) -> Result<Self, PlatformError> {
        let next = data
            .get("next")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let items = match collection_key {
            Some(key) => data.get(key).cloned(),
            None => Some(data),
        };
        match items {
            Some(Value::Array(items)) => Ok(Self { items, next }),
            Some(Value::Null) => Ok(Self { items: vec![], next }),
            _ => Err(PlatformError::UnexpectedResponse(format!(
                "page does not have a list of items at {:?}",
                collection_key
            ))),
        }
    }
}

/// What to ask for when fetching a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// The previous page's `next` link. When present it replaces the
    /// collection's own path.
    pub cursor: Option<String>,
}

/// Create a [futures::Stream] of items built from the pages of a collection.
///
/// With an explicit `page`, exactly that page is fetched. Otherwise pages are
/// fetched by following each page's `next` link until one comes back empty.
/// No page is fetched until the stream is polled, and no cursor is fetched
/// twice.
pub fn paginate<'a, T, F, Fut, B>(
    mut fetch: F,
    build: B,
    page: Option<u32>,
    per_page: Option<u32>,
) -> impl Stream<Item = Result<T, PlatformError>> + 'a
where
    T: 'a,
    F: FnMut(PageRequest) -> Fut + 'a,
    Fut: Future<Output = Result<Page<Value>, PlatformError>> + 'a,
    B: Fn(Value) -> Result<T, PlatformError> + 'a,
{
    try_stream! {
        if let Some(page) = page {
            let request = PageRequest { page: Some(page), per_page, cursor: None };
            for item in fetch(request).await?.items {
                yield build(item)?;
            }
        } else {
            let mut seen = HashSet::new();
            let mut request = PageRequest { page: None, per_page, cursor: None };
            loop {
                let fetched = fetch(request.clone()).await?;
                for item in fetched.items {
                    yield build(item)?;
                }
                match fetched.next {
                    Some(next) if !next.is_empty() => {
                        if !seen.insert(next.clone()) {
                            log::warn!("Page link {} was already fetched, stopping.", next);
                            break;
                        }
                        request.cursor = Some(next);
                    }
                    _ => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use rstest::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[rstest]
    #[case(json!({"things": [1, 2], "next": "x"}), Some("things"), 2, Some("x"))]
    #[case(json!({"things": [1], "next": ""}), Some("things"), 1, None)]
    #[case(json!([1, 2, 3]), None, 3, None)]
    #[case(json!({"things": null}), Some("things"), 0, None)]
    fn test_from_response(
        #[case] data: Value,
        #[case] key: Option<&str>,
        #[case] count: usize,
        #[case] next: Option<&str>,
    ) {
        let page = Page::from_response(data, key).unwrap();
        assert_eq!(page.items.len(), count);
        assert_eq!(page.next.as_deref(), next);
    }

    #[test]
    fn test_from_response_without_items() {
        let err = Page::from_response(json!({"other": []}), Some("things")).unwrap_err();
        assert!(matches!(err, PlatformError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_repeated_cursor_stops() {
        let requests = Mutex::new(Vec::new());
        let log = &requests;
        let fetch = move |request: PageRequest| async move {
            log.lock().unwrap().push(request);
            Ok(Page {
                items: vec![json!(1)],
                next: Some("same".to_string()),
            })
        };
        let items: Vec<Value> = paginate(fetch, Ok, None, Some(5)).try_collect().await.unwrap();
        assert_eq!(items.len(), 2);
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].per_page, Some(5));
        assert_eq!(requests[1].cursor.as_deref(), Some("same"));
    }

    #[tokio::test]
    async fn test_build_error_ends_stream() {
        let fetch = |_: PageRequest| async {
            Ok(Page {
                items: vec![json!(1), json!("two")],
                next: None,
            })
        };
        let build = |v: Value| {
            v.as_i64()
                .ok_or_else(|| PlatformError::UnexpectedResponse(v.to_string()))
        };
        let result: Result<Vec<i64>, _> = paginate(fetch, build, None, None).try_collect().await;
        assert!(result.is_err());
    }
}
