//! Tag-driven teardown of a cluster's Prism Central infrastructure
//!
//! Nothing is remembered between attempts. Each attempt lists remote state,
//! keeps what carries the cluster's ownership category, deletes it, and
//! waits for Prism to confirm every delete task. Attempts repeat on a fixed
//! interval until one succeeds in every stage or the run is cancelled.
//!
//! ```text
//! Uninstaller::run
//!   └─ TeardownLoop (attempt 1, 2, ...)
//!        ├─ volume groups ─┐
//!        ├─ VMs            ├─ list → filter by tag → delete → TaskWaiter
//!        ├─ images        ─┘
//!        └─ categories: values, then key
//! ```

mod cancel;
pub mod config;
pub mod error;
pub mod stage;
pub mod task;
pub mod teardown;
mod uninstaller;

#[cfg(test)]
pub(crate) mod testing;

pub use config::TeardownConfig;
pub use error::{Error, Result};
pub use teardown::{AttemptReport, StageResult, TeardownLoop, TeardownState};
pub use uninstaller::{StageSummary, TeardownReport, Uninstaller};

pub use tokio_util::sync::CancellationToken;
