//! The poll-and-reconcile state machine.
//!
//! [`Reconciler`] owns the [`SessionState`] and runs one *tick* at a time:
//!
//! ```text
//!              identity?
//!                 │ no ──────────────────────────────> Err(IdentityUnavailable)
//!                 │ yes
//!        connection_degraded?
//!          │ no                         │ yes
//!     fetch status                 synthesize degraded result
//!      │ ok        │ request error      (decay by poll_interval)
//!      │           └──> enter degraded mode
//!      │                (decay by connection_timeout)
//!      ▼                         ▼
//!   saved := remaining_seconds (when present)
//!   notice rising edge, one-shot power command
//!      ▼
//!   Decision { block_input, show_overlay, remaining_minutes, notice, power }
//! ```
//!
//! # Degraded mode (for beginners)
//!
//! The server is the source of truth for how much time a machine has left.
//! If the server disappears, unlocking everything would hand out free time,
//! and locking everything would punish users for a network problem.  The
//! reconciler instead keeps counting down from the last value the server
//! confirmed, charging one poll interval per tick.  After
//! `reconnection_backoff` seconds it forces a real request again; as soon
//! as the server answers, its numbers replace the local estimate.
//!
//! The network call itself is injected as a closure so the whole state
//! machine is deterministic in tests: exactly one of "call the server" or
//! "synthesize locally" happens per tick.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::notice::NoticeEvent;
use crate::domain::session::{PollConfig, PollResult, PowerAction, SessionState};
use crate::protocol::status::{FetchError, StatusResponse};

/// Per-tick error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    /// No network interface matched the configured patterns.
    #[error("no MAC addresses matching the configured interfaces")]
    IdentityUnavailable,
    /// The status request failed.  The reconciler never returns this; it is
    /// routed into degraded mode and reported on [`TickOutcome`].
    #[error("couldn't connect to server: {0}")]
    RequestFailed(FetchError),
    /// The server answered but has no record for this identity.
    #[error("MAC address '{0}' not registered")]
    UnregisteredIdentity(String),
    /// Required configuration is missing or malformed.
    #[error("configuration could not be loaded: {0}")]
    ConfigLoadFailure(String),
    /// The session was halted; no further ticks run.
    #[error("polling has been stopped")]
    Halted,
}

impl TickError {
    /// Returns `true` for errors that end polling for good.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TickError::ConfigLoadFailure(_) | TickError::Halted)
    }

    /// Returns `true` when the scheduler should wait an extra cool-down
    /// period before the next tick.
    ///
    /// Request failures are excluded: degraded mode already paces them.
    pub fn wants_cooldown(&self) -> bool {
        matches!(
            self,
            TickError::IdentityUnavailable | TickError::UnregisteredIdentity(_)
        )
    }
}

/// Where this tick's [`PollResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// The server answered this tick.
    Online,
    /// The result was synthesized from the local countdown.
    Degraded,
}

/// What the capabilities (input gate, overlay, power control) must do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub block_input: bool,
    pub show_overlay: bool,
    pub remaining_seconds: Option<u64>,
    pub remaining_minutes: Option<u64>,
    /// Present only on the rising edge of `show_time_notice`.
    pub notice: Option<NoticeEvent>,
    /// Present at most once per process.
    pub power: Option<PowerAction>,
    pub link: LinkState,
}

/// Result of a successful tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub decision: Decision,
    /// The request error that pushed this tick into degraded mode, if any.
    pub request_failure: Option<FetchError>,
}

/// The reconciliation engine.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: PollConfig,
    state: SessionState,
}

impl Reconciler {
    /// Creates an engine with fresh startup state.
    pub fn new(config: PollConfig) -> Self {
        let state = SessionState::new(&config);
        Self { config, state }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns `false` once the session has been halted.
    pub fn is_running(&self) -> bool {
        self.state.iterate
    }

    /// Stops all further ticks.
    pub fn halt(&mut self) {
        self.state.halt();
    }

    /// Returns `true` if the next tick will call the server.
    pub fn will_poll_server(&self) -> bool {
        !self.state.connection_degraded
    }

    /// Runs one tick.
    ///
    /// `fetch` is invoked at most once, with the identity, and only when the
    /// session is not in degraded mode.
    ///
    /// # Errors
    ///
    /// - [`TickError::Halted`] after [`halt`](Self::halt).
    /// - [`TickError::IdentityUnavailable`] when `identity` is `None`; the
    ///   state is left untouched.
    /// - [`TickError::UnregisteredIdentity`] when the server answers without
    ///   a lock status; the state is left untouched.
    pub async fn tick<F, Fut>(
        &mut self,
        identity: Option<&str>,
        fetch: F,
    ) -> Result<TickOutcome, TickError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<StatusResponse, FetchError>>,
    {
        if !self.state.iterate {
            return Err(TickError::Halted);
        }
        let identity = identity.ok_or(TickError::IdentityUnavailable)?;

        let (result, link, request_failure) = if self.state.connection_degraded {
            (self.synthesize_degraded(None), LinkState::Degraded, None)
        } else {
            match fetch(identity.to_string()).await {
                Ok(response) => {
                    let result = response
                        .to_poll_result()
                        .ok_or_else(|| TickError::UnregisteredIdentity(identity.to_string()))?;
                    self.state.clear_degraded();
                    (result, LinkState::Online, None)
                }
                Err(e) if !e.is_request_failure() => {
                    return Err(TickError::UnregisteredIdentity(identity.to_string()));
                }
                Err(e) => {
                    info!(
                        saved = self.state.saved_remaining_seconds,
                        "status request failed, entering degraded mode: {e}"
                    );
                    (self.synthesize_degraded(Some(&e)), LinkState::Degraded, Some(e))
                }
            }
        };

        Ok(TickOutcome {
            decision: self.apply(result, link),
            request_failure,
        })
    }

    /// Builds a locally estimated result and advances the degraded-mode
    /// bookkeeping.
    ///
    /// `failure` is `Some` on the tick whose request just failed; that tick is
    /// charged `connection_timeout` instead of `poll_interval`.
    fn synthesize_degraded(&mut self, failure: Option<&FetchError>) -> PollResult {
        let cfg = self.config;
        let elapsed = self.state.degraded_elapsed_seconds;

        let decay = if failure.is_some() {
            self.state.connection_degraded = true;
            cfg.connection_timeout
        } else {
            cfg.poll_interval
        };
        let new_remaining = self.state.saved_remaining_seconds.saturating_sub(decay);
        self.state.saved_remaining_seconds = new_remaining;

        let early_ticks = elapsed <= cfg.notice.degraded_ticks.saturating_mul(cfg.poll_interval);
        let threshold = cfg.notice.reminder_threshold_secs;
        let crossing_reminder =
            threshold.saturating_sub(cfg.poll_interval) < new_remaining && new_remaining < threshold;

        self.state.degraded_elapsed_seconds = elapsed.saturating_add(cfg.poll_interval);
        if self.state.degraded_elapsed_seconds > cfg.reconnection_backoff {
            debug!(
                elapsed = self.state.degraded_elapsed_seconds,
                "reconnection backoff elapsed; next tick retries the server"
            );
            self.state.clear_degraded();
        }

        PollResult {
            is_locked: new_remaining == 0,
            remaining_seconds: Some(new_remaining),
            show_time_notice: early_ticks || crossing_reminder,
            shutdown: false,
            restart: false,
        }
    }

    /// Steps 3–6: fold the result into the session state and emit the
    /// decision.
    fn apply(&mut self, result: PollResult, link: LinkState) -> Decision {
        if let Some(remaining) = result.remaining_seconds {
            self.state.saved_remaining_seconds = remaining;
        }

        let remaining_minutes = result.remaining_minutes();

        let notice = if result.show_time_notice {
            if self.state.time_notice_shown {
                None
            } else {
                self.state.time_notice_shown = true;
                Some(NoticeEvent {
                    remaining_minutes: remaining_minutes.unwrap_or(0),
                })
            }
        } else {
            self.state.time_notice_shown = false;
            None
        };

        let power = match result.power_action() {
            Some(action) if self.state.power_action_issued.is_none() => {
                self.state.power_action_issued = Some(action);
                Some(action)
            }
            _ => None,
        };

        Decision {
            block_input: result.is_locked,
            show_overlay: result.is_locked,
            remaining_seconds: result.remaining_seconds,
            remaining_minutes,
            notice,
            power,
            link,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
