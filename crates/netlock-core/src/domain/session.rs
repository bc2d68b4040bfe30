//! Session state and timing policy.
//!
//! [`SessionState`] is the single record the client carries from one tick to
//! the next.  It is created once at startup from [`PollConfig`], mutated only
//! by [`Reconciler`](super::reconcile::Reconciler), and dropped when the
//! process exits.  Nothing is persisted across restarts.
//!
//! All durations are whole seconds (`u64`) because that is the unit used by
//! the status endpoint (`remainingSeconds`) and by the settings file.

use serde::{Deserialize, Serialize};

/// When a degraded tick should surface a time-remaining notice.
///
/// Two independent triggers:
///
/// 1. The first `degraded_ticks` ticks after losing the server, so the user
///    learns the countdown is now local.
/// 2. Once, as the local countdown crosses `reminder_threshold_secs`
///    (five minutes by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePolicy {
    /// Number of poll intervals after entering degraded mode during which
    /// the notice is shown.
    pub degraded_ticks: u64,
    /// Remaining-time mark (seconds) at which a reminder is raised.
    pub reminder_threshold_secs: u64,
}

impl Default for NoticePolicy {
    fn default() -> Self {
        Self {
            degraded_ticks: 5,
            reminder_threshold_secs: 300,
        }
    }
}

/// Timing policy for the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between ticks; also the amount the local countdown decays per
    /// degraded tick.
    pub poll_interval: u64,
    /// Remaining-time budget assumed before the server has ever answered.
    pub initial_time: u64,
    /// Seconds spent in degraded mode before a real request is retried.
    pub reconnection_backoff: u64,
    /// Upper bound on one status request; also the penalty charged to the
    /// countdown when a request fails.
    pub connection_timeout: u64,
    /// Notice thresholds.
    pub notice: NoticePolicy,
}

impl Default for PollConfig {
    /// | Field                | Default |
    /// |----------------------|---------|
    /// | poll_interval        | 5 s     |
    /// | initial_time         | 120 s   |
    /// | reconnection_backoff | 300 s   |
    /// | connection_timeout   | 3 s     |
    fn default() -> Self {
        Self {
            poll_interval: 5,
            initial_time: 120,
            reconnection_backoff: 300,
            connection_timeout: 3,
            notice: NoticePolicy::default(),
        }
    }
}

/// A one-shot remote power command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerAction {
    Shutdown,
    Restart,
}

/// The authoritative view of this machine's status for one tick.
///
/// Produced either from a server response or synthesized locally while the
/// server is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollResult {
    pub is_locked: bool,
    /// `None` means the budget is unbounded or unknown.
    pub remaining_seconds: Option<u64>,
    pub show_time_notice: bool,
    pub shutdown: bool,
    pub restart: bool,
}

impl PollResult {
    /// Returns the power command carried by this result, if any.
    ///
    /// Shutdown wins when both flags are set: a restart after a shutdown
    /// request would undo what the operator asked for.
    pub fn power_action(&self) -> Option<PowerAction> {
        if self.shutdown {
            Some(PowerAction::Shutdown)
        } else if self.restart {
            Some(PowerAction::Restart)
        } else {
            None
        }
    }

    /// Whole minutes remaining, rounded down.
    pub fn remaining_minutes(&self) -> Option<u64> {
        self.remaining_seconds.map(|secs| secs / 60)
    }
}

/// Everything the reconciler remembers between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Last known (or locally decayed) time budget in seconds.
    pub saved_remaining_seconds: u64,
    /// `true` once a request has failed, until contact is re-established or
    /// the reconnection backoff elapses.
    pub connection_degraded: bool,
    /// Seconds accumulated in degraded mode.  Always 0 when
    /// `connection_degraded` is `false`.
    pub degraded_elapsed_seconds: u64,
    /// Rising-edge latch for time-remaining notices.
    pub time_notice_shown: bool,
    /// `false` is terminal: no further ticks are run.
    pub iterate: bool,
    /// Set once a remote power command has been issued so it never fires
    /// twice in the same process.
    pub power_action_issued: Option<PowerAction>,
}

impl SessionState {
    /// Creates the startup state for the given policy.
    pub fn new(config: &PollConfig) -> Self {
        Self {
            saved_remaining_seconds: config.initial_time,
            connection_degraded: false,
            degraded_elapsed_seconds: 0,
            time_notice_shown: false,
            iterate: true,
            power_action_issued: None,
        }
    }

    /// Stops all further ticks.
    pub fn halt(&mut self) {
        self.iterate = false;
    }

    pub(crate) fn clear_degraded(&mut self) {
        self.connection_degraded = false;
        self.degraded_elapsed_seconds = 0;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
