//! Recording input gate for tests and `--dry-run`.
//!
//! The real gate installs system-wide hooks that would swallow the test
//! runner's own keyboard and mouse.  `RecordingInputGate` keeps only the
//! state and counts how many times suppression would have been installed,
//! which is what the idempotency checks need.
//!
//! Set `should_fail = true` to simulate a hook installation failure.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{GateError, InputGate};

#[derive(Default)]
pub struct RecordingInputGate {
    blocked: AtomicBool,
    installs: AtomicUsize,
    /// Every state change actually applied, in order.
    pub transitions: Mutex<Vec<bool>>,
    /// When `true`, blocking returns [`GateError::HookInstall`].
    pub should_fail: bool,
}

impl RecordingInputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times suppression was (virtually) installed.
    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl InputGate for RecordingInputGate {
    fn set_input_blocked(&self, blocked: bool) -> Result<(), GateError> {
        if blocked && self.should_fail {
            return Err(GateError::HookInstall("mock failure".into()));
        }
        if self.blocked.swap(blocked, Ordering::SeqCst) == blocked {
            return Ok(());
        }
        if blocked {
            self.installs.fetch_add(1, Ordering::SeqCst);
        }
        self.transitions.lock().unwrap().push(blocked);
        Ok(())
    }

    fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
