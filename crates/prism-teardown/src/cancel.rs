//! Racing suspension points against the run's cancellation token

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Await `fut` unless `cancel` fires first
pub(crate) async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        output = fut => Ok(output),
    }
}

/// Sleep for `duration` unless `cancel` fires first
pub(crate) async fn sleep_or_cancel(cancel: &CancellationToken, duration: Duration) -> Result<()> {
    cancellable(cancel, tokio::time::sleep(duration)).await
}
