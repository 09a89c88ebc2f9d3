use crate::errors::{JobError, PlatformError};
use crate::jobs::JobStatusResponse;
use crate::session::{QueryValue, Session};
use crate::types::{JobStatus, TaskStatus};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

/// How long, and how often, to poll for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Give up once this much time has passed since polling started.
    pub timeout: Duration,
    /// Time between consecutive status requests.
    pub polling_delay: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2 * 60),
            polling_delay: Duration::from_secs(2),
        }
    }
}

impl PollingConfig {
    pub fn new(timeout: Duration, polling_delay: Duration) -> Self {
        Self { timeout, polling_delay }
    }

    /// Batch deletes are polled more often.
    pub fn batch_delete() -> Self {
        Self {
            polling_delay: Duration::from_secs(1),
            ..Self::default()
        }
    }
}

/// Poll the status of a job until it succeeds, fails, or `config.timeout` elapses.
///
/// Each iteration makes exactly one status request. Polling gives up as soon
/// as the next request would fall after the timeout, so no request is ever
/// made past it.
pub async fn poll_for_job_completion(
    session: &dyn Session,
    project_id: Uuid,
    job_id: Uuid,
    config: &PollingConfig,
) -> Result<JobStatusResponse, JobError> {
    let path = format!("projects/{}/execution/job-status", project_id);
    let params = vec![("job_id", QueryValue::String(job_id.to_string()))];
    let deadline = Instant::now() + config.timeout;
    let status = loop {
        let response = session.get_resource(&path, &params).await?;
        let status: JobStatusResponse = serde_json::from_value(response).map_err(PlatformError::from)?;
        if status.effective_status().is_terminal() {
            break status;
        }
        if Instant::now() + config.polling_delay > deadline {
            log::error!("Job exceeded user timeout of {:?}.", config.timeout);
            log::debug!("Last status: {:?}", status);
            return Err(JobError::Timeout {
                job_id,
                timeout: config.timeout,
            });
        }
        log::info!(
            "Job still in progress, polling status again in {:.2} seconds.",
            config.polling_delay.as_secs_f64()
        );
        sleep(config.polling_delay).await;
    };

    if status.effective_status() == JobStatus::Failure {
        log::debug!("Job terminated with Failure status: {:?}", status);
        for task in status.tasks.iter().filter(|t| t.status == TaskStatus::Failure) {
            if let Some(reason) = task.failure_reason.as_deref() {
                log::error!("Task {} failed with reason \"{}\"", task.id, reason);
            }
        }
        return Err(JobError::Failure {
            job_id,
            failure_reasons: status.failure_reasons(),
        });
    }
    Ok(status)
}
