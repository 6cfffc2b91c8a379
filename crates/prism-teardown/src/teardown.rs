//! Teardown loop
//!
//! Runs every stage, in order, once per attempt. An attempt in which every
//! stage succeeds ends the loop; otherwise the loop sleeps for the fixed
//! retry interval and starts over. There is no attempt cap: only success or
//! cancellation stop it.

use std::time::Duration;

use tracing::{debug, info};

use crate::cancel::sleep_or_cancel;
use crate::stage::{CleanupStage, StageContext};
use crate::{Error, Result};

/// Where the loop is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownState {
    /// `attempt` (1-based) is next to run
    Pending { attempt: u32 },
    /// Attempt `attempts` succeeded in every stage
    Done { attempts: u32 },
    /// Cancelled after `attempts` attempts were started
    Cancelled { attempts: u32 },
}

impl TeardownState {
    pub fn initial() -> Self {
        TeardownState::Pending { attempt: 1 }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TeardownState::Pending { .. })
    }
}

/// Outcome of one stage in one attempt
#[derive(Debug)]
pub struct StageResult {
    pub stage: &'static str,
    /// Entities removed, or why the stage failed
    pub outcome: Result<usize>,
}

impl StageResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Outcome of every stage in one attempt, in stage order
#[derive(Debug)]
pub struct AttemptReport {
    pub attempt: u32,
    pub stages: Vec<StageResult>,
}

impl AttemptReport {
    pub fn is_success(&self) -> bool {
        self.stages.iter().all(StageResult::is_success)
    }

    pub fn failed_stages(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .filter(|s| !s.is_success())
            .map(|s| s.stage)
            .collect()
    }
}

/// Drives stages until one attempt succeeds everywhere
pub struct TeardownLoop {
    ctx: StageContext,
    stages: Vec<Box<dyn CleanupStage>>,
    retry_interval: Duration,
}

impl TeardownLoop {
    pub fn new(
        ctx: StageContext,
        stages: Vec<Box<dyn CleanupStage>>,
        retry_interval: Duration,
    ) -> Self {
        Self {
            ctx,
            stages,
            retry_interval,
        }
    }

    /// Run every stage once
    ///
    /// A stage failure never skips later stages. Only cancellation ends the
    /// attempt early.
    pub async fn run_attempt(&self, attempt: u32) -> Result<AttemptReport> {
        let mut stages = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let name = stage.name();
            let outcome = match stage.run(&self.ctx).await {
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    debug!(attempt, stage = name, error = %e, "Stage failed");
                    Err(e)
                }
                Ok(deleted) => Ok(deleted),
            };
            stages.push(StageResult {
                stage: name,
                outcome,
            });
        }

        Ok(AttemptReport { attempt, stages })
    }

    /// Advance the state machine by one attempt
    ///
    /// Attempts after the first wait `retry_interval` before running.
    /// Terminal states are returned unchanged.
    pub async fn step(&self, state: TeardownState) -> (TeardownState, Option<AttemptReport>) {
        let attempt = match state {
            TeardownState::Pending { attempt } => attempt,
            terminal => return (terminal, None),
        };

        if attempt > 1 {
            // cancellation is picked up by the check below
            let _ = sleep_or_cancel(&self.ctx.cancel, self.retry_interval).await;
        }
        if self.ctx.cancel.is_cancelled() {
            return (
                TeardownState::Cancelled {
                    attempts: attempt.saturating_sub(1),
                },
                None,
            );
        }

        debug!(attempt, "Starting teardown attempt");
        match self.run_attempt(attempt).await {
            Ok(report) if report.is_success() => {
                (TeardownState::Done { attempts: attempt }, Some(report))
            }
            Ok(report) => {
                info!(
                    attempt,
                    failed = ?report.failed_stages(),
                    retry_in = ?self.retry_interval,
                    "Teardown attempt incomplete"
                );
                (
                    TeardownState::Pending {
                        attempt: attempt + 1,
                    },
                    Some(report),
                )
            }
            Err(_) => (TeardownState::Cancelled { attempts: attempt }, None),
        }
    }

    /// Step until a terminal state, returning it with the last attempt's report
    pub async fn run(&self) -> (TeardownState, Option<AttemptReport>) {
        let mut state = TeardownState::initial();
        let mut last = None;
        while !state.is_terminal() {
            let (next, report) = self.step(state).await;
            state = next;
            if report.is_some() {
                last = report;
            }
        }
        (state, last)
    }
}
