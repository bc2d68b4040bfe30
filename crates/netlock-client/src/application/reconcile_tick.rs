//! ReconcileTickUseCase: runs one poll-and-reconcile cycle and applies the
//! resulting decision to the capabilities.
//!
//! This use case sits at the application layer.  It owns the
//! [`Reconciler`] (and therefore the only copy of the session state),
//! resolves the identity, hands the engine a closure that performs the
//! status request, and then drives the [`InputGate`], [`OverlayPresenter`],
//! and [`PowerControl`] from the emitted [`Decision`].
//!
//! Every per-tick failure is caught here and logged; nothing escapes that
//! could stop the scheduler except a fatal [`TickError`].

use std::sync::Arc;

use netlock_core::{Decision, LinkState, PollConfig, Reconciler, TickError};
use tracing::{debug, error, info, warn};

use super::ports::{IdentityResolver, InputGate, OverlayPresenter, PowerControl, StatusSource};

/// The capability set a use case is wired to.
#[derive(Clone)]
pub struct Capabilities {
    pub identity: Arc<dyn IdentityResolver>,
    pub status: Arc<dyn StatusSource>,
    pub gate: Arc<dyn InputGate>,
    pub overlay: Arc<dyn OverlayPresenter>,
    pub power: Arc<dyn PowerControl>,
}

/// The Reconcile Tick use case.
pub struct ReconcileTickUseCase {
    engine: Reconciler,
    caps: Capabilities,
    last_link: Option<LinkState>,
}

impl ReconcileTickUseCase {
    /// Creates a use case with fresh session state.
    pub fn new(config: PollConfig, caps: Capabilities) -> Self {
        Self {
            engine: Reconciler::new(config),
            caps,
            last_link: None,
        }
    }

    /// Read-only access to the engine, mainly for tests and status logging.
    pub fn engine(&self) -> &Reconciler {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Stops polling for good.
    pub fn halt(&mut self) {
        self.engine.halt();
    }

    /// Runs one tick.
    ///
    /// Request failures are absorbed into degraded mode and surfaced as an
    /// error notification; the returned decision has already been applied.
    ///
    /// # Errors
    ///
    /// Returns the [`TickError`] for identity, registration, or halt
    /// failures.  The error has already been logged.
    pub async fn run_tick(&mut self) -> Result<Decision, TickError> {
        let identity = match self.caps.identity.resolve() {
            Ok(addresses) => addresses.into_iter().next(),
            Err(e) => {
                warn!("identity resolution failed: {e}");
                None
            }
        };

        let status = Arc::clone(&self.caps.status);
        let result = self
            .engine
            .tick(identity.as_deref(), |id| async move {
                status.fetch_status(&id).await
            })
            .await;

        match result {
            Ok(outcome) => {
                if let Some(failure) = outcome.request_failure {
                    let err = TickError::RequestFailed(failure);
                    error!("REQUEST ERROR: {err}");
                    self.caps
                        .overlay
                        .notify_error("REQUEST ERROR", "Couldn't connect to server");
                }
                self.apply(&outcome.decision);
                Ok(outcome.decision)
            }
            Err(e) => {
                error!("ERROR: {e}");
                Err(e)
            }
        }
    }

    /// Releases input and hides the overlay.
    ///
    /// Called whenever polling ends so input is never left blocked.
    pub fn fail_open(&self) {
        if let Err(e) = self.caps.gate.set_input_blocked(false) {
            error!("failed to release input gate: {e}");
        }
        self.caps.overlay.set_overlay_visible(false);
        self.caps.overlay.teardown();
        info!("input released and overlay torn down");
    }

    fn apply(&mut self, decision: &Decision) {
        if self.last_link != Some(decision.link) {
            match decision.link {
                LinkState::Online => info!("status server reachable (ONLINE)"),
                LinkState::Degraded => warn!("status server unreachable, counting down locally (OFFLINE)"),
            }
            self.last_link = Some(decision.link);
        }

        if self.caps.gate.is_blocked() != decision.block_input {
            info!(locked = decision.block_input, "lock state changed");
        }
        if let Err(e) = self.caps.gate.set_input_blocked(decision.block_input) {
            error!("input gate error: {e}");
        }
        self.caps.overlay.set_overlay_visible(decision.show_overlay);

        if !decision.block_input {
            let label = match decision.link {
                LinkState::Online => "ONLINE",
                LinkState::Degraded => "OFFLINE",
            };
            debug!(remaining_seconds = ?decision.remaining_seconds, "{label}");
        }

        if let Some(notice) = decision.notice {
            info!("time notice: {}", notice.message());
            self.caps.overlay.show_time_notice(notice.remaining_minutes);
        }

        if let Some(action) = decision.power {
            info!("remote power command: {action:?}");
            if let Err(e) = self.caps.power.execute(action) {
                error!("power command failed: {e}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
