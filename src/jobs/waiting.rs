use crate::errors::{PlatformError, WaitError};
use crate::informatics::InformaticsModule;
use crate::jobs::PollingConfig;
use crate::types::ModuleStatus;
use std::future::Future;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

/// A resource which reports a platform status.
pub trait HasStatus {
    fn status(&self) -> Option<&str>;
}

impl HasStatus for InformaticsModule {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Re-fetch a resource until its status is not one of `waiting`.
///
/// The first fetch happens immediately, and no fetch is made after the
/// timeout. A resource without a status is not waited on.
pub async fn wait_while_status<T, F, Fut>(
    uid: Uuid,
    mut fetch: F,
    waiting: &[&str],
    config: &PollingConfig,
) -> Result<T, WaitError>
where
    T: HasStatus,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    let deadline = Instant::now() + config.timeout;
    loop {
        let item = fetch().await?;
        let still_waiting = item.status().map(|s| waiting.contains(&s)).unwrap_or(false);
        if !still_waiting {
            return Ok(item);
        }
        if Instant::now() + config.polling_delay > deadline {
            return Err(WaitError::Timeout {
                uid,
                status: item.status().map(str::to_string),
                timeout: config.timeout,
            });
        }
        log::debug!("{} is {:?}, checking again in {:?}", uid, item.status(), config.polling_delay);
        sleep(config.polling_delay).await;
    }
}

/// Re-fetch a module until the platform has finished validating it.
pub async fn wait_while_validating<T, F, Fut>(uid: Uuid, fetch: F, config: &PollingConfig) -> Result<T, WaitError>
where
    T: HasStatus,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    wait_while_status(uid, fetch, ModuleStatus::IN_PROGRESS, config).await
}
