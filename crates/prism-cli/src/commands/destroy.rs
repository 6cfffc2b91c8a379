//! Destroy command - tear down a cluster's Prism Central infrastructure
//!
//! Usage: prism destroy --dir <install-dir>
//!
//! Reads `metadata.json` written by the installer, then deletes every volume
//! group, VM, image and category carrying the cluster's ownership tag.
//! Retries until everything is gone; Ctrl-C or `--deadline` stops it.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use prism_common::{ClusterMetadata, PrismCredentials, METADATA_FILE_NAME};
use prism_teardown::{CancellationToken, TeardownConfig, Uninstaller};
use tracing::info;

use super::cancel_on_signal;
use crate::{Error, Result};

/// Destroy a cluster's Prism Central infrastructure
#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Installation directory containing metadata.json
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Path to the metadata file (takes precedence over --dir)
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Prism Central username (overrides metadata)
    #[arg(long, env = "NUTANIX_USERNAME")]
    pub username: Option<String>,

    /// Prism Central password (overrides metadata)
    #[arg(long, env = "NUTANIX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Seconds between teardown attempts
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    pub retry_interval: u64,

    /// Seconds between task status polls
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub task_poll_interval: u64,

    /// Seconds to wait for a single task
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    pub task_timeout: u64,

    /// Leave volume groups in place
    #[arg(long)]
    pub skip_volume_groups: bool,

    /// Only delete volume groups whose description contains this text
    #[arg(long)]
    pub volume_description_marker: Option<String>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub deadline: Option<u64>,
}

impl DestroyArgs {
    pub fn metadata_path(&self) -> PathBuf {
        self.metadata
            .clone()
            .unwrap_or_else(|| self.dir.join(METADATA_FILE_NAME))
    }

    pub fn teardown_config(&self) -> TeardownConfig {
        TeardownConfig {
            retry_interval: Duration::from_secs(self.retry_interval),
            task_poll_interval: Duration::from_secs(self.task_poll_interval),
            task_timeout: Duration::from_secs(self.task_timeout),
            cleanup_volume_groups: !self.skip_volume_groups,
            volume_description_marker: self.volume_description_marker.clone(),
        }
    }

    /// Credentials from metadata with command line overrides applied
    pub fn credentials(&self, metadata: &ClusterMetadata) -> Result<PrismCredentials> {
        metadata.validate()?;
        let mut credentials =
            PrismCredentials::from_metadata(&metadata.nutanix, metadata.port()?)
                .with_overrides(self.username.clone(), self.password.clone());
        if self.insecure {
            credentials.insecure = true;
        }
        Ok(credentials)
    }

    fn deadline(&self) -> Result<Option<Duration>> {
        match self.deadline {
            Some(0) => Err(Error::validation("--deadline must be greater than zero")),
            Some(secs) => Ok(Some(Duration::from_secs(secs))),
            None => Ok(None),
        }
    }
}

fn load_metadata(args: &DestroyArgs) -> Result<ClusterMetadata> {
    let path = args.metadata_path();
    if !path.exists() {
        return Err(Error::MetadataNotFound { path });
    }
    Ok(ClusterMetadata::from_file(&path)?)
}

pub async fn run(args: DestroyArgs) -> Result<()> {
    let deadline = args.deadline()?;
    let metadata = load_metadata(&args)?;
    let credentials = args.credentials(&metadata)?;

    info!(
        cluster = %metadata.cluster_name,
        infra_id = %metadata.infra_id,
        prism_central = %credentials.endpoint,
        "Destroying cluster"
    );

    let uninstaller = Uninstaller::connect(
        metadata.identity(),
        &credentials,
        args.teardown_config(),
    )?;

    let cancel = CancellationToken::new();
    cancel_on_signal(cancel.clone(), deadline);

    let result = uninstaller.run(cancel.clone()).await;
    cancel.cancel();

    let report = result?;
    println!("{}", report);
    Ok(())
}
