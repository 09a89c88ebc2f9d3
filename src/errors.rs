//! Errors for this crate.
//! About anyhow: see https://github.com/TrueLayer/reqwest-middleware/issues/119

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum InvalidPlatformUrl {
    #[error("Given URL does not end with \"/\": {0}")]
    TrailingSlash(String),

    #[error("Given URL does not start with \"http://\" or \"https://\": {0}")]
    Protocol(String),
}

aliri_braid::from_infallible!(InvalidPlatformUrl);

/// Errors representing failed interactions with the platform.
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    /// Error response with an explanation from the platform.
    #[error("({status:?} {reason:?}): {text}")]
    Error {
        status: StatusCode,
        reason: &'static str,
        text: String,
        source: reqwest::Error,
    },

    /// Error response without explanation from the platform.
    #[error(transparent)]
    Raw(#[from] reqwest::Error),

    /// Error from reqwest middleware function.
    #[error(transparent)]
    Middleware(anyhow::Error),

    /// The response was received but could not be turned into a resource.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The response is missing something every response of its kind should have.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub(crate) async fn check(res: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
    match res.error_for_status_ref() {
        Ok(_) => Ok(res),
        Err(source) => {
            let status = res.status();
            let reason = status.canonical_reason().unwrap_or("unknown reason");
            let text = res.text().await.map_err(PlatformError::Raw)?;
            Err(PlatformError::Error {
                status,
                reason,
                text,
                source,
            })
        }
    }
}

impl From<reqwest_middleware::Error> for PlatformError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Middleware(e) => PlatformError::Middleware(e),
            reqwest_middleware::Error::Reqwest(e) => PlatformError::Raw(e),
        }
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(error: serde_json::Error) -> Self {
        PlatformError::Resource(ResourceError::Json(error))
    }
}

/// A field could not be read from, or written to, its JSON path.
#[derive(thiserror::Error, Debug)]
pub enum PropertyError {
    /// A required path is absent.
    #[error("missing required key \"{path}\"")]
    Missing { path: String },

    /// The value at the path does not satisfy the field's codec.
    #[error("field \"{field}\" expected {expected}, got {value}")]
    Invalid {
        field: String,
        value: Value,
        expected: String,
    },

    /// A nested object failed to build.
    #[error("field \"{field}\": {source}")]
    Nested {
        field: String,
        source: Box<ResourceError>,
    },

    /// The property only exists in requests sent to the platform.
    #[error("field \"{field}\" is write-only")]
    WriteOnly { field: String },
}

impl PropertyError {
    pub(crate) fn invalid(field: &str, value: &Value, expected: impl Into<String>) -> Self {
        PropertyError::Invalid {
            field: field.to_string(),
            value: value.clone(),
            expected: expected.into(),
        }
    }
}

/// The concrete type of a polymorphic payload could not be resolved.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("cannot build a {family}: discriminator \"{path}\" is missing")]
    MissingDiscriminator { family: &'static str, path: String },

    #[error("{value} is not a valid {family} type. Must be one of: {}", legal.join(", "))]
    UnknownDiscriminator {
        family: &'static str,
        value: String,
        legal: Vec<String>,
    },
}

/// A schema-derived module failed its schema's constraints.
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("{class} is missing required field \"{field}\"")]
    MissingField { class: String, field: String },

    #[error("{class} has no field \"{field}\"")]
    UnknownField { class: String, field: String },

    #[error(transparent)]
    Invalid(#[from] PropertyError),

    /// Schema-specific attributes were accessed before the schema payload was attached.
    #[error("cannot access \"{attribute}\" of {class}: module payload is not instantiated")]
    NotInstantiated { class: String, attribute: String },

    #[error("no module class named \"{name}\" in \"{bucket}\"")]
    UnknownClass { bucket: String, name: String },

    #[error("{0} is a shared sub-schema, not a registrable module")]
    NotRegistrable(String),
}

/// The schema catalog is unusable. Raised while compiling, never afterwards.
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("\"{definition}\" references \"{reference}\", which is not defined")]
    UnresolvedRef {
        definition: String,
        reference: String,
    },

    #[error("catalog entry {schema_id} has a schema without a title")]
    MissingTitle { schema_id: Uuid },

    #[error("catalog entry {schema_id} reuses the title \"{title}\"")]
    DuplicateTitle { schema_id: Uuid, title: String },

    #[error("schema id {0} appears more than once")]
    DuplicateSchemaId(Uuid),

    #[error("malformed schema \"{definition}\": {reason}")]
    Malformed { definition: String, reason: String },

    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

/// A resource could not be built from, or dumped to, its JSON form.
#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Errors for waiting on asynchronous jobs.
#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("Job {job_id} timed out after {timeout:?}")]
    Timeout { job_id: Uuid, timeout: Duration },

    #[error("Job {job_id} terminated with Failure status. Failure reasons: {failure_reasons:?}")]
    Failure {
        job_id: Uuid,
        failure_reasons: Vec<String>,
    },

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl From<reqwest_middleware::Error> for JobError {
    fn from(error: reqwest_middleware::Error) -> Self {
        PlatformError::from(error).into()
    }
}

/// Errors for waiting on a module to leave a transient status.
#[derive(thiserror::Error, Debug)]
pub enum WaitError {
    #[error("{uid} is still {status:?} after {timeout:?}")]
    Timeout {
        uid: Uuid,
        status: Option<String>,
        timeout: Duration,
    },

    #[error("cannot wait on a resource which has not been registered")]
    Unregistered,

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Errors for batch deletion of GEMD objects.
#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("If more than {limit} deletes are requested ({count} were), every entry must be a full entity (object or template)")]
    EntitiesRequired { limit: usize, count: usize },

    #[error("{0} does not look like a UUID")]
    NotAUuid(String),

    #[error("{0}")]
    Unsupported(&'static str),

    #[error("entity of type {0} has no uids to delete it by")]
    MissingUid(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Job(#[from] JobError),
}

/// Errors for connecting a [crate::PlatformClient].
#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The module catalog could not be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<reqwest::Error> for ConnectError {
    fn from(error: reqwest::Error) -> Self {
        PlatformError::Raw(error).into()
    }
}
