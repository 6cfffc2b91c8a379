//! Error types for teardown

use std::time::Duration;

use prism_client::{ClientError, TaskStatus};

/// Teardown Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while tearing down a cluster
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("task {task_uuid} {status}: {error_detail} (progress: {progress_message})")]
    TaskFailed {
        task_uuid: String,
        status: TaskStatus,
        error_detail: String,
        progress_message: String,
    },

    #[error("timed out after {timeout:?} waiting for task {task_uuid}")]
    TaskTimeout { task_uuid: String, timeout: Duration },

    #[error("task {task_uuid} reported unexpected status {status}")]
    UnexpectedTaskStatus { task_uuid: String, status: String },

    #[error("{} of {total} tasks failed: {}", failures.len(), failures.join("; "))]
    TaskBatch { failures: Vec<String>, total: usize },

    #[error("{stage} cleanup failed: {}", errors.join("; "))]
    Stage {
        stage: &'static str,
        errors: Vec<String>,
    },

    #[error("teardown cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(#[from] prism_common::Error),

    #[error("failed to destroy cluster: {source}")]
    Destroy {
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn stage(stage: &'static str, errors: Vec<String>) -> Self {
        Error::Stage { stage, errors }
    }

    pub fn destroy(source: Error) -> Self {
        Error::Destroy {
            source: Box::new(source),
        }
    }

    /// True if the run stopped because it was cancelled, wrapped or not
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Destroy { source } => source.is_cancelled(),
            _ => false,
        }
    }
}
