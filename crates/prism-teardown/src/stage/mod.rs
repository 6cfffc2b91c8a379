//! Cleanup stages
//!
//! A stage removes every remaining cluster-owned entity of one kind. Stages
//! hold no state between attempts: each run re-lists remote state and
//! re-applies the ownership filter, so running a stage after it already
//! succeeded is a no-op.

mod category;
mod resource;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use prism_client::PrismApi;
use prism_common::OwnershipTag;
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::config::TeardownConfig;
use crate::task::TaskWaiter;
use crate::Result;

pub use category::CategoryCleanup;
pub use resource::{ResourceCleanup, ResourceKind};

/// One step of a teardown attempt
#[async_trait]
pub trait CleanupStage: Send + Sync {
    /// Stage name used in logs and reports
    fn name(&self) -> &'static str;

    /// Delete what remains, returning the number of entities removed
    async fn run(&self, ctx: &StageContext) -> Result<usize>;
}

/// Everything a stage needs for one run
#[derive(Clone)]
pub struct StageContext {
    pub api: Arc<dyn PrismApi>,
    pub tag: OwnershipTag,
    pub waiter: TaskWaiter,
    pub cancel: CancellationToken,
}

impl StageContext {
    pub fn new(
        api: Arc<dyn PrismApi>,
        tag: OwnershipTag,
        config: &TeardownConfig,
        cancel: CancellationToken,
    ) -> Self {
        let waiter = TaskWaiter::from_config(api.clone(), config);
        Self {
            api,
            tag,
            waiter,
            cancel,
        }
    }

    /// Await a remote call, aborting with `Cancelled` if the run is cancelled
    pub(crate) async fn call<F: Future>(&self, fut: F) -> Result<F::Output> {
        cancellable(&self.cancel, fut).await
    }
}

/// Stages in teardown order: volume groups (if enabled), VMs, images,
/// categories. Categories stay last; every other entity carries one.
pub fn default_stages(config: &TeardownConfig) -> Vec<Box<dyn CleanupStage>> {
    let mut stages: Vec<Box<dyn CleanupStage>> = Vec::new();
    if config.cleanup_volume_groups {
        stages.push(Box::new(ResourceCleanup::volume_groups(
            config.volume_description_marker.clone(),
        )));
    }
    stages.push(Box::new(ResourceCleanup::vms()));
    stages.push(Box::new(ResourceCleanup::images()));
    stages.push(Box::new(CategoryCleanup));
    stages
}
