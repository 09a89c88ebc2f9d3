use serde::{Deserialize, Serialize};

/// Status of a platform job as a whole.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum JobStatus {
    Running,
    Success,
    Failure,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

/// Status of a single task within a job.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TaskStatus {
    Submitted,
    Pending,
    Running,
    Success,
    Failure,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }
}

/// Well-known values of a module's `status`.
///
/// The platform adds statuses freely, so module status is kept as a plain string.
pub struct ModuleStatus;

impl ModuleStatus {
    pub const CREATED: &'static str = "CREATED";
    pub const VALIDATING: &'static str = "VALIDATING";
    pub const READY: &'static str = "READY";
    pub const INVALID: &'static str = "INVALID";
    pub const ERROR: &'static str = "ERROR";

    /// Statuses a module passes through before validation finishes.
    pub const IN_PROGRESS: &'static [&'static str] = &[Self::VALIDATING, Self::CREATED];
}

/// Pattern used when asking the platform to configure a default predictor.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AutoConfigurePattern {
    #[default]
    Plain,
    Formulation,
}
