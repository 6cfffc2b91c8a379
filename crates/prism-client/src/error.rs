//! Structured errors from the Prism Central API
//!
//! Callers branch on [`ErrorKind`] instead of matching message text, so
//! "already deleted" is a `NotFound`, never a substring search.

use thiserror::Error;

/// Broad classification of a client error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed entity does not exist
    NotFound,
    /// Connection, timeout or server-side failure; may succeed later
    Transient,
    /// The request was rejected or the response was unusable
    Fatal,
}

/// Errors returned by [`crate::PrismApi`] operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Entity does not exist (HTTP 404)
    #[error("{entity} not found")]
    NotFound {
        /// Description of the missing entity (e.g., "vm 1234")
        entity: String,
    },

    /// Connection failure, timeout, throttling or 5xx response
    #[error("transient error during {operation}: {message}")]
    Transient {
        /// Operation being performed (e.g., "list vms")
        operation: String,
        /// Description of what failed
        message: String,
        /// HTTP status, if a response was received
        status: Option<u16>,
    },

    /// Request rejected (4xx other than 404) or malformed response
    #[error("{operation} failed: {message}")]
    Fatal {
        /// Operation being performed
        operation: String,
        /// Description of what failed
        message: String,
        /// HTTP status, if a response was received
        status: Option<u16>,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// Create a not-found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    /// Create a transient error without an HTTP status
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            operation: operation.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a fatal error without an HTTP status
    pub fn fatal(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fatal {
            operation: operation.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Classify an HTTP error status for an operation on an entity
    pub fn from_status(
        operation: impl Into<String>,
        entity: impl Into<String>,
        status: u16,
        body: &str,
    ) -> Self {
        let message = format!("HTTP {}: {}", status, summarize_body(body));
        match status {
            404 => Self::not_found(entity),
            408 | 429 | 500..=599 => Self::Transient {
                operation: operation.into(),
                message,
                status: Some(status),
            },
            _ => Self::Fatal {
                operation: operation.into(),
                message,
                status: Some(status),
            },
        }
    }

    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::Transient { .. } => ErrorKind::Transient,
            ClientError::Fatal { .. } | ClientError::Build(_) => ErrorKind::Fatal,
        }
    }

    /// Returns true if the addressed entity does not exist
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// HTTP status of the failed response, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::NotFound { .. } => Some(404),
            ClientError::Transient { status, .. } | ClientError::Fatal { status, .. } => *status,
            ClientError::Build(_) => None,
        }
    }
}

/// Prism error bodies carry a `message_list`; fall back to the raw text
fn summarize_body(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let messages: Vec<&str> = parsed
        .as_ref()
        .and_then(|v| v.get("message_list"))
        .and_then(|l| l.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|m| m.get("message").and_then(|m| m.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if !messages.is_empty() {
        return messages.join("; ");
    }

    let trimmed = body.trim();
    if trimmed.len() > 512 {
        let mut end = 512;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}
