//! Waiting on Prism Central asynchronous tasks
//!
//! Every mutating call returns a task UUID. A deletion only counts once its
//! task reaches `SUCCEEDED`; `FAILED` and `INVALID_UUID` are terminal errors
//! and any status outside the known vocabulary fails immediately rather than
//! polling until the timeout.

use std::sync::Arc;
use std::time::Duration;

use prism_client::{PrismApi, TaskStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::cancel::{cancellable, sleep_or_cancel};
use crate::config::TeardownConfig;
use crate::{Error, Result};

/// Polls task status until a terminal state, a timeout, or cancellation
#[derive(Clone)]
pub struct TaskWaiter {
    api: Arc<dyn PrismApi>,
    poll_interval: Duration,
    timeout: Duration,
}

impl TaskWaiter {
    pub fn new(api: Arc<dyn PrismApi>, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            api,
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(api: Arc<dyn PrismApi>, config: &TeardownConfig) -> Self {
        Self::new(api, config.task_poll_interval, config.task_timeout)
    }

    /// Wait for one task to succeed
    ///
    /// Errors from the status query itself are returned as-is; the caller's
    /// next attempt is the retry.
    pub async fn wait(&self, task_uuid: &str, cancel: &CancellationToken) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.poll(task_uuid, cancel)).await {
            Ok(result) => result,
            Err(_) => Err(Error::TaskTimeout {
                task_uuid: task_uuid.to_string(),
                timeout: self.timeout,
            }),
        }
    }

    async fn poll(&self, task_uuid: &str, cancel: &CancellationToken) -> Result<()> {
        loop {
            let task = cancellable(cancel, self.api.get_task(task_uuid)).await??;
            trace!(task = %task_uuid, status = %task.status, "Polled task");

            match task.status {
                TaskStatus::Queued | TaskStatus::Running => {}
                TaskStatus::Succeeded => return Ok(()),
                TaskStatus::Failed | TaskStatus::InvalidUuid => {
                    return Err(Error::TaskFailed {
                        task_uuid: task_uuid.to_string(),
                        status: task.status,
                        error_detail: task.error_detail.unwrap_or_default(),
                        progress_message: task.progress_message.unwrap_or_default(),
                    });
                }
                TaskStatus::Unknown(status) => {
                    return Err(Error::UnexpectedTaskStatus {
                        task_uuid: task_uuid.to_string(),
                        status,
                    });
                }
            }

            sleep_or_cancel(cancel, self.poll_interval).await?;
        }
    }

    /// Wait for every task, collecting failures
    ///
    /// All tasks are waited on even after one fails, so a single bad task
    /// does not hide the outcome of the rest. Cancellation stops at once.
    pub async fn wait_all(&self, task_uuids: &[String], cancel: &CancellationToken) -> Result<()> {
        let mut failures = Vec::new();

        for task_uuid in task_uuids {
            match self.wait(task_uuid, cancel).await {
                Ok(()) => debug!(task = %task_uuid, "Task succeeded"),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    warn!(task = %task_uuid, error = %e, "Task did not succeed");
                    failures.push(e.to_string());
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::TaskBatch {
                failures,
                total: task_uuids.len(),
            })
        }
    }
}
