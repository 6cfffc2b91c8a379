//! Entry point: destroy every Prism Central resource a cluster owns

use std::fmt;
use std::sync::Arc;

use prism_client::{PrismApi, PrismClient};
use prism_common::{ClusterIdentity, ClusterMetadata, PrismCredentials};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::TeardownConfig;
use crate::stage::{default_stages, StageContext};
use crate::teardown::{AttemptReport, TeardownLoop, TeardownState};
use crate::{Error, Result};

/// Entities one stage removed in the final attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: &'static str,
    pub deleted: usize,
}

/// Result of a completed teardown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeardownReport {
    pub cluster_id: String,
    pub infra_id: String,
    /// Attempts run, including the final successful one
    pub attempts: u32,
    pub stages: Vec<StageSummary>,
}

impl TeardownReport {
    fn new(identity: &ClusterIdentity, attempts: u32, last: Option<AttemptReport>) -> Self {
        let stages = last
            .map(|report| {
                report
                    .stages
                    .into_iter()
                    .map(|s| StageSummary {
                        stage: s.stage,
                        deleted: s.outcome.unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            cluster_id: identity.cluster_id.clone(),
            infra_id: identity.infra_id.clone(),
            attempts,
            stages,
        }
    }

    pub fn total_deleted(&self) -> usize {
        self.stages.iter().map(|s| s.deleted).sum()
    }
}

impl fmt::Display for TeardownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cluster {} ({}) destroyed after {} attempt(s)",
            self.infra_id, self.cluster_id, self.attempts
        )?;
        for stage in &self.stages {
            write!(f, "\n  {}: {} deleted", stage.stage, stage.deleted)?;
        }
        Ok(())
    }
}

/// Tears down one cluster's infrastructure
pub struct Uninstaller {
    api: Arc<dyn PrismApi>,
    identity: ClusterIdentity,
    config: TeardownConfig,
}

impl Uninstaller {
    /// Build an uninstaller from the installer's metadata
    ///
    /// Credentials come from the metadata, overridden by `NUTANIX_USERNAME`
    /// and `NUTANIX_PASSWORD` when set.
    pub fn new(metadata: &ClusterMetadata, config: TeardownConfig) -> Result<Self> {
        let credentials = metadata.credentials()?;
        Self::connect(metadata.identity(), &credentials, config)
    }

    /// Build an uninstaller talking to Prism Central with explicit credentials
    pub fn connect(
        identity: ClusterIdentity,
        credentials: &PrismCredentials,
        config: TeardownConfig,
    ) -> Result<Self> {
        config.validate()?;
        prism_common::metadata::validate_credentials(credentials)?;
        let client = PrismClient::connect(credentials)?;
        Ok(Self::with_api(Arc::new(client), identity, config))
    }

    /// Build an uninstaller over any [`PrismApi`] implementation
    pub fn with_api(
        api: Arc<dyn PrismApi>,
        identity: ClusterIdentity,
        config: TeardownConfig,
    ) -> Self {
        Self {
            api,
            identity,
            config,
        }
    }

    pub fn identity(&self) -> &ClusterIdentity {
        &self.identity
    }

    /// Run teardown until every stage succeeds in one attempt
    ///
    /// Never gives up on its own; cancel `cancel` to stop. Cancellation is
    /// returned as `Error::Destroy` wrapping `Error::Cancelled`.
    #[instrument(
        skip(self, cancel),
        fields(cluster = %self.identity.cluster_id, infra_id = %self.identity.infra_id)
    )]
    pub async fn run(&self, cancel: CancellationToken) -> Result<TeardownReport> {
        info!(
            category = %self.identity.ownership_tag().key(),
            volume_groups = self.config.cleanup_volume_groups,
            retry_interval = ?self.config.retry_interval,
            "Starting cluster teardown"
        );

        let ctx = StageContext::new(
            self.api.clone(),
            self.identity.ownership_tag(),
            &self.config,
            cancel,
        );
        let teardown = TeardownLoop::new(
            ctx,
            default_stages(&self.config),
            self.config.retry_interval,
        );

        match teardown.run().await {
            (TeardownState::Done { attempts }, last) => {
                let report = TeardownReport::new(&self.identity, attempts, last);
                info!(
                    attempts,
                    deleted = report.total_deleted(),
                    "Cluster teardown complete"
                );
                Ok(report)
            }
            (TeardownState::Cancelled { attempts }, _)
            | (TeardownState::Pending { attempt: attempts }, _) => {
                warn!(attempts, "Cluster teardown cancelled");
                Err(Error::destroy(Error::Cancelled))
            }
        }
    }
}
