//! Generic access to a REST collection of platform resources.

use crate::errors::{PlatformError, ResourceError, WaitError};
use crate::informatics::Catalog;
use crate::jobs::{wait_while_validating, HasStatus, PollingConfig};
use crate::pagination::{paginate, Page, PageRequest};
use crate::session::{QueryParams, QueryValue, Session};
use futures::Stream;
use serde_json::Value;
use shrinkwraprs::Shrinkwrap;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// What a resource may need while being built from a platform payload.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub catalog: Arc<Catalog>,
}

impl BuildContext {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

/// A platform object with a JSON representation.
pub trait Resource: Sized {
    fn build(data: Value, context: &BuildContext) -> Result<Self, ResourceError>;

    fn dump(&self) -> Result<Value, ResourceError>;

    /// Platform-assigned identifier. `None` before registration.
    fn uid(&self) -> Option<Uuid>;
}

/// A built resource together with the session and project it came from.
///
/// The link is attached by the [Collection] which built the resource.
#[derive(Shrinkwrap, Clone)]
#[shrinkwrap(mutable)]
pub struct Linked<R> {
    #[shrinkwrap(main_field)]
    pub object: R,
    pub(crate) session: Arc<dyn Session>,
    pub(crate) context: BuildContext,
    pub project_id: Option<Uuid>,
}

impl<R> Linked<R> {
    pub fn into_inner(self) -> R {
        self.object
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }
}

impl<R: Debug> Debug for Linked<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linked")
            .field("object", &self.object)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl<R: HasStatus> HasStatus for Linked<R> {
    fn status(&self) -> Option<&str> {
        self.object.status()
    }
}

/// A REST collection of `R`.
pub struct Collection<R> {
    session: Arc<dyn Session>,
    path: String,
    project_id: Option<Uuid>,
    collection_key: Option<&'static str>,
    individual_key: Option<&'static str>,
    module_type: Option<&'static str>,
    context: BuildContext,
    phantom: PhantomData<fn() -> R>,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            path: self.path.clone(),
            project_id: self.project_id,
            collection_key: self.collection_key,
            individual_key: self.individual_key,
            module_type: self.module_type,
            context: self.context.clone(),
            phantom: PhantomData,
        }
    }
}

impl<R: Resource> Collection<R> {
    pub(crate) fn new(session: Arc<dyn Session>, path: impl Into<String>, context: BuildContext) -> Self {
        Self {
            session,
            path: path.into(),
            project_id: None,
            collection_key: None,
            individual_key: None,
            module_type: None,
            context,
            phantom: PhantomData,
        }
    }

    /// A collection of modules of one type, listed under `entries`.
    pub(crate) fn modules(
        session: Arc<dyn Session>,
        project_id: Uuid,
        module_type: Option<&'static str>,
        context: BuildContext,
    ) -> Self {
        let mut collection = Self::new(session, format!("projects/{}/modules", project_id), context)
            .in_project(project_id)
            .keys(None, Some("entries"));
        collection.module_type = module_type;
        collection
    }

    pub(crate) fn in_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub(crate) fn keys(mut self, individual: Option<&'static str>, collection: Option<&'static str>) -> Self {
        self.individual_key = individual;
        self.collection_key = collection;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn project_id(&self) -> Option<Uuid> {
        self.project_id
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub(crate) fn item_path(&self, uid: Uuid) -> String {
        format!("{}/{}", self.path, uid)
    }

    /// Attach this collection's session and project to `object`.
    pub fn link(&self, object: R) -> Linked<R> {
        Linked {
            object,
            session: Arc::clone(&self.session),
            context: self.context.clone(),
            project_id: self.project_id,
        }
    }

    /// Build one resource from a platform payload.
    pub fn build(&self, data: Value) -> Result<Linked<R>, PlatformError> {
        let object = R::build(data, &self.context)?;
        Ok(self.link(object))
    }

    pub(crate) fn individual(&self, data: Value) -> Result<Value, PlatformError> {
        match self.individual_key {
            None => Ok(data),
            Some(key) => match data {
                Value::Object(mut map) => map
                    .remove(key)
                    .ok_or_else(|| PlatformError::UnexpectedResponse(format!("response has no \"{}\"", key))),
                _ => Err(PlatformError::UnexpectedResponse(format!(
                    "expected an object containing \"{}\"",
                    key
                ))),
            },
        }
    }

    /// Query parameters for one page. A cursor replaces `page`, while the
    /// page size and module type filter are sent with every request.
    fn page_params(&self, request: &PageRequest) -> QueryParams {
        let mut params = QueryParams::new();
        if let (Some(page), None) = (request.page, &request.cursor) {
            params.push(("page", QueryValue::from(page)));
        }
        if let Some(per_page) = request.per_page {
            params.push(("per_page", QueryValue::from(per_page)));
        }
        if let Some(module_type) = self.module_type {
            params.push(("module_type", QueryValue::from(module_type)));
        }
        params
    }

    /// Fetch one page of raw items. A search body turns the request into a
    /// `POST` to the collection's search endpoint.
    pub async fn fetch_page(&self, request: &PageRequest, search: Option<&Value>) -> Result<Page<Value>, PlatformError> {
        let params = self.page_params(request);
        let data = match (search, request.cursor.as_deref()) {
            (None, Some(cursor)) => self.session.get_resource(cursor, &params).await?,
            (None, None) => self.session.get_resource(&self.path, &params).await?,
            (Some(body), Some(cursor)) => self.session.post_resource(cursor, body, &params).await?,
            (Some(body), None) => {
                let path = format!("{}/search", self.path);
                self.session.post_resource(&path, body, &params).await?
            }
        };
        Page::from_response(data, self.collection_key)
    }

    /// List every resource in the collection, or only those on `page`.
    pub fn list(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> impl Stream<Item = Result<Linked<R>, PlatformError>> + '_ {
        paginate(
            move |request| async move { self.fetch_page(&request, None).await },
            move |data| self.build(data),
            page,
            per_page,
        )
    }

    /// Like [Collection::list], restricted to resources matching `body`.
    pub fn search(
        &self,
        body: Value,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> impl Stream<Item = Result<Linked<R>, PlatformError>> + '_ {
        let body = Arc::new(body);
        paginate(
            move |request| {
                let body = Arc::clone(&body);
                async move { self.fetch_page(&request, Some(body.as_ref())).await }
            },
            move |data| self.build(data),
            page,
            per_page,
        )
    }

    pub async fn get(&self, uid: Uuid) -> Result<Linked<R>, PlatformError> {
        let data = self.session.get_resource(&self.item_path(uid), &vec![]).await?;
        self.build(self.individual(data)?)
    }

    /// Send a new resource to the platform.
    pub async fn register(&self, model: &R) -> Result<Linked<R>, PlatformError> {
        let body = model.dump()?;
        let data = self.session.post_resource(&self.path, &body, &vec![]).await?;
        self.build(self.individual(data)?)
    }

    /// Replace a registered resource with `model`.
    pub async fn update(&self, model: &R) -> Result<Linked<R>, PlatformError> {
        let uid = model.uid().ok_or_else(|| {
            ResourceError::Invalid("cannot update a resource which has not been registered".to_string())
        })?;
        let body = model.dump()?;
        let data = self.session.put_resource(&self.item_path(uid), &body).await?;
        self.build(self.individual(data)?)
    }

    pub async fn delete(&self, uid: Uuid) -> Result<(), PlatformError> {
        self.session.delete_resource(&self.item_path(uid)).await?;
        Ok(())
    }
}

impl<R: Resource + HasStatus> Collection<R> {
    /// Re-fetch `uid` until the platform has finished validating it.
    pub async fn wait_while_validating(&self, uid: Uuid, config: &PollingConfig) -> Result<Linked<R>, WaitError> {
        wait_while_validating(uid, || self.get(uid), config).await
    }

    /// Wait for a resource returned by [Collection::register] or [Collection::update].
    pub async fn wait_for(&self, resource: &Linked<R>, config: &PollingConfig) -> Result<Linked<R>, WaitError> {
        let uid = resource.uid().ok_or(WaitError::Unregistered)?;
        self.wait_while_validating(uid, config).await
    }
}
