//! Prism CLI
//!
//! Destroys the Prism Central infrastructure of an installed cluster.

use clap::Parser;

use prism_cli::{Cli, Result};
use prism_common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        format: cli.log_format.into(),
        ..Default::default()
    })?;

    let result = cli.run().await;
    shutdown_telemetry();
    result
}
