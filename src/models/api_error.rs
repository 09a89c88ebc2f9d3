use crate::models::LinkByUid;
use serde::{Deserialize, Serialize};

/// Structured error returned by the platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ValidationErrorDetail {
    #[serde(default)]
    pub failure_message: Option<String>,
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub failure_id: Option<String>,
}

/// An object which could not be deleted, and why.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeleteFailure {
    pub id: LinkByUid,
    pub cause: ApiError,
}
