//! Prism Central client for cluster teardown
//!
//! [`PrismApi`] is the narrow contract teardown depends on: list, delete and
//! task-status operations per resource kind. [`PrismClient`] implements it
//! against the Prism Central v3 REST API.

#![deny(missing_docs)]

mod api;
mod client;
mod error;
pub mod models;

pub use api::PrismApi;
pub use client::{PrismClient, CONNECT_TIMEOUT, LIST_PAGE_SIZE};
pub use error::{ClientError, ErrorKind};
pub use models::{CategoryKey, ManagedResource, Task, TaskStatus};

/// Empty list filter: return every entity of the kind
pub const EMPTY_FILTER: &str = "";
