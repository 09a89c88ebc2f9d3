//! The transport seam every collection talks through.

use crate::errors::PlatformError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum QueryValue {
    U32(u32),
    Bool(bool),
    String(String),
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::U32(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

/// Query string parameters. A key may repeat to send a list.
pub type QueryParams = Vec<(&'static str, QueryValue)>;

/// JSON-in, JSON-out access to the platform API.
///
/// Paths are relative to the platform's base URL. Absolute URLs, such as
/// pagination links, are used as they are.
#[async_trait]
pub trait Session: Send + Sync {
    async fn get_resource(&self, path: &str, params: &QueryParams) -> Result<Value, PlatformError>;

    async fn post_resource(&self, path: &str, json: &Value, params: &QueryParams) -> Result<Value, PlatformError>;

    async fn put_resource(&self, path: &str, json: &Value) -> Result<Value, PlatformError>;

    /// Responses without a body are returned as `null`.
    async fn delete_resource(&self, path: &str) -> Result<Value, PlatformError>;
}
