//! CLI commands

use std::time::Duration;

use prism_teardown::CancellationToken;
use tracing::warn;

pub mod destroy;

/// Cancel `cancel` on Ctrl-C, or once `deadline` elapses if one is given
pub fn cancel_on_signal(cancel: CancellationToken, deadline: Option<Duration>) {
    tokio::spawn(async move {
        let deadline_elapsed = async {
            match deadline {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        let interrupted = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interrupted => warn!("Interrupted, cancelling teardown"),
            _ = deadline_elapsed => {
                warn!(deadline = ?deadline, "Deadline reached, cancelling teardown");
            }
        }
        cancel.cancel();
    });
}
