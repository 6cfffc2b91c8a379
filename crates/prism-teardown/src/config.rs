//! Teardown tuning knobs

use std::time::Duration;

use crate::{Error, Result};

/// Interval between teardown attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Interval between task status polls
pub const DEFAULT_TASK_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum time to wait for a single task
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for a teardown run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeardownConfig {
    /// Fixed delay between attempts (no backoff)
    pub retry_interval: Duration,
    /// Delay between task status polls
    pub task_poll_interval: Duration,
    /// Per-task wait limit
    pub task_timeout: Duration,
    /// Run the volume group stage
    pub cleanup_volume_groups: bool,
    /// Only delete volume groups whose description contains this marker
    pub volume_description_marker: Option<String>,
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            task_poll_interval: DEFAULT_TASK_POLL_INTERVAL,
            task_timeout: DEFAULT_TASK_TIMEOUT,
            cleanup_volume_groups: true,
            volume_description_marker: None,
        }
    }
}

impl TeardownConfig {
    pub fn validate(&self) -> Result<()> {
        if self.retry_interval.is_zero() {
            return Err(invalid("retry_interval", "must be greater than zero"));
        }
        if self.task_poll_interval.is_zero() {
            return Err(invalid("task_poll_interval", "must be greater than zero"));
        }
        if self.task_timeout.is_zero() {
            return Err(invalid("task_timeout", "must be greater than zero"));
        }
        if self.task_poll_interval > self.task_timeout {
            return Err(invalid(
                "task_poll_interval",
                format!(
                    "must not exceed task_timeout ({:?} > {:?})",
                    self.task_poll_interval, self.task_timeout
                ),
            ));
        }
        if let Some(marker) = &self.volume_description_marker {
            if marker.trim().is_empty() {
                return Err(invalid("volume_description_marker", "must not be blank"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> Error {
    Error::Config(prism_common::Error::validation(field, message))
}
