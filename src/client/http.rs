use crate::errors::{check, PlatformError};
use crate::session::{QueryParams, Session};
use crate::types::PlatformUrl;
use async_trait::async_trait;
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde_json::Value;

/// [Session] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: ClientWithMiddleware,
    url: PlatformUrl,
}

impl HttpSession {
    pub fn new(client: ClientWithMiddleware, url: PlatformUrl) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &PlatformUrl {
        &self.url
    }

    async fn send(&self, req: RequestBuilder) -> Result<Value, PlatformError> {
        let res = req.send().await?;
        let text = check(res).await?.text().await?;
        if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn get_resource(&self, path: &str, params: &QueryParams) -> Result<Value, PlatformError> {
        let req = self.client.get(self.url.join(path)).query(params);
        self.send(req).await
    }

    async fn post_resource(&self, path: &str, json: &Value, params: &QueryParams) -> Result<Value, PlatformError> {
        let req = self.client.post(self.url.join(path)).query(params).json(json);
        self.send(req).await
    }

    async fn put_resource(&self, path: &str, json: &Value) -> Result<Value, PlatformError> {
        let req = self.client.put(self.url.join(path)).json(json);
        self.send(req).await
    }

    async fn delete_resource(&self, path: &str) -> Result<Value, PlatformError> {
        let req = self.client.delete(self.url.join(path));
        self.send(req).await
    }
}
