use crate::types::{JobStatus, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Returned synchronously by requests which start a job.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSubmissionResponse {
    pub job_id: Uuid,
}

/// Status of one task of a job.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub id: String,
    pub task_type: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Status of a job and all of its tasks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobStatusResponse {
    pub job_type: String,
    pub status: JobStatus,
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
    #[serde(default)]
    pub output: Option<BTreeMap<String, String>>,
}

impl JobStatusResponse {
    /// The job's status, which is `Running` while any task has yet to finish.
    pub fn effective_status(&self) -> JobStatus {
        if self.tasks.iter().any(|t| !t.status.is_terminal()) {
            JobStatus::Running
        } else {
            self.status
        }
    }

    /// Reasons given by every failed task, in task order.
    pub fn failure_reasons(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failure)
            .filter_map(|t| t.failure_reason.clone())
            .collect()
    }

    pub fn output(&self, key: &str) -> Option<&str> {
        self.output.as_ref()?.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    fn task(status: &str, reason: Option<&str>) -> serde_json::Value {
        json!({"id": "t", "task_type": "build", "status": status, "dependencies": [], "failure_reason": reason})
    }

    #[rstest]
    #[case("Success", vec!["Success", "Success"], JobStatus::Success)]
    #[case("Success", vec!["Success", "Pending"], JobStatus::Running)]
    #[case("Failure", vec!["Failure", "Submitted"], JobStatus::Running)]
    #[case("Running", vec![], JobStatus::Running)]
    fn test_effective_status(#[case] status: &str, #[case] tasks: Vec<&str>, #[case] expected: JobStatus) {
        let response: JobStatusResponse = serde_json::from_value(json!({
            "job_type": "x",
            "status": status,
            "tasks": tasks.into_iter().map(|s| task(s, None)).collect::<Vec<_>>()
        }))
        .unwrap();
        assert_eq!(response.effective_status(), expected);
    }

    #[rstest]
    fn test_failure_reasons() {
        let response: JobStatusResponse = serde_json::from_value(json!({
            "job_type": "x",
            "status": "Failure",
            "tasks": [task("Failure", Some("X")), task("Success", None), task("Failure", None)],
            "output": {"k": "v"}
        }))
        .unwrap();
        assert_eq!(response.failure_reasons(), vec!["X"]);
        assert_eq!(response.output("k"), Some("v"));
    }
}
