//! Poll scheduler: drives the reconcile use case at a fixed interval until
//! the session halts or a shutdown is requested.
//!
//! The first tick runs immediately.  After a tick that wants a cooldown
//! (no identity, unregistered identity) the next one is delayed by an extra
//! `error_cooldown`.  When the loop ends, for any reason, the use case is
//! failed open so input is never left blocked.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use super::reconcile_tick::ReconcileTickUseCase;

/// Why the scheduler stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    /// A shutdown was requested (Ctrl-C or the owner dropped the sender).
    ShutdownRequested,
    /// The session halted (fatal tick error or an explicit halt).
    Halted,
}

/// Fixed-interval tick driver.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    error_cooldown: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration, error_cooldown: Duration) -> Self {
        Self {
            interval,
            error_cooldown,
        }
    }

    /// Runs ticks until halted or `shutdown` becomes `true`.
    pub async fn run(
        &self,
        use_case: &mut ReconcileTickUseCase,
        mut shutdown: watch::Receiver<bool>,
    ) -> SchedulerExit {
        let exit = loop {
            if *shutdown.borrow() {
                break SchedulerExit::ShutdownRequested;
            }
            if !use_case.is_running() {
                break SchedulerExit::Halted;
            }

            let delay = match use_case.run_tick().await {
                Ok(_) => self.interval,
                Err(e) if e.is_fatal() => {
                    error!("fatal tick error, stopping: {e}");
                    use_case.halt();
                    break SchedulerExit::Halted;
                }
                Err(e) if e.wants_cooldown() => self.interval + self.error_cooldown,
                Err(_) => self.interval,
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    // A dropped sender counts as a shutdown request.
                    if changed.is_err() {
                        break SchedulerExit::ShutdownRequested;
                    }
                }
            }
        };

        info!(?exit, "poll loop stopped");
        use_case.fail_open();
        exit
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
