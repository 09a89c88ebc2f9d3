//! An in-memory [Session] which replays scripted responses and records requests.

#![allow(dead_code)]

use async_trait::async_trait;
use citrine::errors::PlatformError;
use citrine::session::{QueryParams, Session};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub params: QueryParams,
    pub body: Option<Value>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<Value> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| serde_json::to_value(v).unwrap())
    }
}

/// Responses are returned in order. Once only one is left it is repeated forever.
#[derive(Default)]
pub struct FakeSession {
    responses: Mutex<VecDeque<Value>>,
    calls: Mutex<Vec<Call>>,
    times: Mutex<Vec<Instant>>,
}

impl FakeSession {
    pub fn new(responses: impl IntoIterator<Item = Value>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
            times: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// When each request was made, on the tokio clock.
    pub fn call_times(&self) -> Vec<Instant> {
        self.times.lock().unwrap().clone()
    }

    fn respond(&self, call: Call) -> Result<Value, PlatformError> {
        self.calls.lock().unwrap().push(call.clone());
        self.times.lock().unwrap().push(Instant::now());
        let mut responses = self.responses.lock().unwrap();
        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        response.ok_or_else(|| PlatformError::UnexpectedResponse(format!("nothing scripted for {:?}", call)))
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn get_resource(&self, path: &str, params: &QueryParams) -> Result<Value, PlatformError> {
        self.respond(Call {
            method: "GET",
            path: path.to_string(),
            params: params.clone(),
            body: None,
        })
    }

    async fn post_resource(&self, path: &str, json: &Value, params: &QueryParams) -> Result<Value, PlatformError> {
        self.respond(Call {
            method: "POST",
            path: path.to_string(),
            params: params.clone(),
            body: Some(json.clone()),
        })
    }

    async fn put_resource(&self, path: &str, json: &Value) -> Result<Value, PlatformError> {
        self.respond(Call {
            method: "PUT",
            path: path.to_string(),
            params: vec![],
            body: Some(json.clone()),
        })
    }

    async fn delete_resource(&self, path: &str) -> Result<Value, PlatformError> {
        self.respond(Call {
            method: "DELETE",
            path: path.to_string(),
            params: vec![],
            body: None,
        })
    }
}

pub const PROJECT_ID: &str = "6b608f78-e341-422c-8076-35adc8828545";

pub fn task(id: &str, status: &str, failure_reason: Option<&str>) -> Value {
    json!({
        "id": id,
        "task_type": "build",
        "status": status,
        "dependencies": [],
        "failure_reason": failure_reason
    })
}

pub fn job_status(status: &str, tasks: Vec<Value>) -> Value {
    json!({"job_type": "test", "status": status, "tasks": tasks})
}

pub fn real(key: &str) -> Value {
    json!({"type": "Real", "descriptor_key": key, "lower_bound": 0.0, "upper_bound": 1.0, "units": ""})
}
