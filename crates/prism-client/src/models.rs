//! Prism Central v3 wire models and the resource shapes teardown consumes
//!
//! Every listable kind (VMs, images, volume groups) is converted into a
//! [`ManagedResource`] so ownership filtering works on one shape.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A remote resource as seen by teardown
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManagedResource {
    /// Remote-assigned UUID
    pub uuid: String,
    /// Display name (used for logging only)
    pub name: String,
    /// Category key/value map
    pub categories: HashMap<String, String>,
    /// Free-form description, if set
    pub description: Option<String>,
}

impl ManagedResource {
    /// Create a resource with no categories
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a category
    pub fn with_category(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.categories.insert(key.into(), value.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Status of an asynchronous Prism task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Accepted, not started
    Queued,
    /// In progress
    Running,
    /// Completed successfully
    Succeeded,
    /// Completed with an error
    Failed,
    /// The task UUID is not known to Prism
    InvalidUuid,
    /// Any status outside the known vocabulary
    Unknown(String),
}

impl TaskStatus {
    /// Parse the wire representation
    pub fn parse(raw: &str) -> Self {
        match raw {
            "QUEUED" => TaskStatus::Queued,
            "RUNNING" => TaskStatus::Running,
            "SUCCEEDED" => TaskStatus::Succeeded,
            "FAILED" => TaskStatus::Failed,
            "INVALID_UUID" => TaskStatus::InvalidUuid,
            other => TaskStatus::Unknown(other.to_string()),
        }
    }

    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Queued => "QUEUED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Succeeded => "SUCCEEDED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::InvalidUuid => "INVALID_UUID",
            TaskStatus::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an asynchronous task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Task UUID
    pub uuid: String,
    /// Current status
    pub status: TaskStatus,
    /// Remote error detail, set on failure
    pub error_detail: Option<String>,
    /// Remote progress message
    pub progress_message: Option<String>,
}

impl Task {
    /// Create a task snapshot with no messages
    pub fn new(uuid: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            uuid: uuid.into(),
            status,
            error_detail: None,
            progress_message: None,
        }
    }
}

/// A category key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryKey {
    /// Key name
    pub name: String,
    /// Key description
    #[serde(default)]
    pub description: Option<String>,
    /// Whether Prism itself owns the key
    #[serde(default)]
    pub system_defined: bool,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ListRequest<'a> {
    pub kind: &'a str,
    pub length: u32,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
    #[serde(default)]
    pub metadata: ListMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListMetadata {
    #[serde(default)]
    pub total_matches: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IntentResource {
    pub metadata: EntityMetadata,
    #[serde(default)]
    pub spec: Option<IntentNames>,
    #[serde(default)]
    pub status: Option<IntentNames>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityMetadata {
    pub uuid: String,
    #[serde(default)]
    pub categories: Option<HashMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IntentNames {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<IntentResource> for ManagedResource {
    fn from(r: IntentResource) -> Self {
        let spec = r.spec.unwrap_or_default();
        let status = r.status.unwrap_or_default();
        ManagedResource {
            uuid: r.metadata.uuid,
            name: spec.name.or(status.name).unwrap_or_default(),
            categories: r.metadata.categories.unwrap_or_default(),
            description: spec.description.or(status.description),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteResponse {
    pub status: DeleteStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteStatus {
    pub execution_context: ExecutionContext,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExecutionContext {
    pub task_uuid: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryValueEntity {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskResponse {
    #[serde(default)]
    pub uuid: Option<String>,
    pub status: String,
    #[serde(default)]
    pub error_detail: Option<String>,
    #[serde(default)]
    pub progress_message: Option<String>,
}

impl TaskResponse {
    pub(crate) fn into_task(self, requested_uuid: &str) -> Task {
        Task {
            uuid: self.uuid.unwrap_or_else(|| requested_uuid.to_string()),
            status: TaskStatus::parse(&self.status),
            error_detail: self.error_detail,
            progress_message: self.progress_message,
        }
    }
}
