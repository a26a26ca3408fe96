//! Rollout watcher — drives the readiness polling state machine.
//!
//! ```text
//! Polling ──ready──────────────▶ Ready
//!    │ └─not ready, budget left─▶ sleep(interval) ─▶ Polling
//!    ├─not ready, budget spent──▶ TimedOut
//!    └─cancel signal────────────▶ Cancelled
//! ```
//!
//! Readiness itself is decided by the client; the watcher only owns the
//! loop and its termination.

use std::time::Instant;

use ocdeploy_client::OrchestrationClient;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::policy::PollPolicy;

/// Current phase of a watched rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutPhase {
    /// Checking readiness; `attempts` failed checks so far.
    Polling { attempts: u32 },
    /// The platform reported a ready rollout.
    Ready,
    /// The attempt budget ran out.
    TimedOut,
    /// The caller cancelled the wait.
    Cancelled,
}

/// Summary of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutOutcome {
    /// Failed checks before the ready one.
    pub attempts: u32,
    /// Readiness queries issued, always `attempts + 1`.
    pub checks: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RolloutError {
    #[error("rollout not ready after {attempts} attempts ({checks} readiness checks)")]
    TimedOut { attempts: u32, checks: u32 },

    #[error("rollout wait cancelled after {checks} readiness checks")]
    Cancelled { checks: u32 },
}

/// Bounded, fixed-interval readiness poller for one rollout.
pub struct RolloutWatcher<'a, C: ?Sized> {
    client: &'a C,
    policy: PollPolicy,
    phase: RolloutPhase,
    attempts: u32,
    checks: u32,
}

impl<'a, C> RolloutWatcher<'a, C>
where
    C: OrchestrationClient + ?Sized,
{
    pub fn new(client: &'a C, policy: PollPolicy) -> Self {
        Self {
            client,
            policy,
            phase: RolloutPhase::Polling { attempts: 0 },
            attempts: 0,
            checks: 0,
        }
    }

    pub fn phase(&self) -> RolloutPhase {
        self.phase
    }

    pub fn checks(&self) -> u32 {
        self.checks
    }

    /// Block until the rollout is ready, the budget is spent, or `cancel` flips to `true`.
    pub async fn wait(
        &mut self,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<RolloutOutcome, RolloutError> {
        let started = Instant::now();
        info!(
            max_attempts = self.policy.max_attempts,
            interval_secs = self.policy.interval.as_secs_f64(),
            "watching rollout"
        );

        loop {
            if *cancel.borrow() {
                return Err(self.cancelled());
            }

            if self.check().await {
                self.phase = RolloutPhase::Ready;
                info!(
                    attempts = self.attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "rollout ready"
                );
                return Ok(RolloutOutcome {
                    attempts: self.attempts,
                    checks: self.checks,
                });
            }

            if self.attempts >= self.policy.max_attempts {
                self.phase = RolloutPhase::TimedOut;
                warn!(
                    attempts = self.attempts,
                    checks = self.checks,
                    "rollout took too long to finish"
                );
                return Err(RolloutError::TimedOut {
                    attempts: self.attempts,
                    checks: self.checks,
                });
            }

            self.attempts += 1;
            self.phase = RolloutPhase::Polling {
                attempts: self.attempts,
            };
            debug!(
                attempt = self.attempts,
                max_attempts = self.policy.max_attempts,
                "rollout not ready, waiting"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.policy.interval) => {}
                _ = cancelled(cancel) => return Err(self.cancelled()),
            }
        }
    }

    /// One readiness query. A failed query counts as "not ready".
    async fn check(&mut self) -> bool {
        self.checks += 1;
        match self.client.is_ready().await {
            Ok(ready) => ready,
            Err(e) => {
                warn!(error = %e, check = self.checks, "readiness check failed");
                false
            }
        }
    }

    fn cancelled(&mut self) -> RolloutError {
        self.phase = RolloutPhase::Cancelled;
        info!(checks = self.checks, "rollout wait cancelled");
        RolloutError::Cancelled {
            checks: self.checks,
        }
    }
}

/// Resolves once the signal reads `true`. Never resolves if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
