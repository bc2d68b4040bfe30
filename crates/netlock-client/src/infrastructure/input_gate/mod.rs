//! Input gate implementations.
//!
//! The suppression backend is selected at compile time via
//! `#[cfg(target_os = ...)]`.  Platforms without a backend get a
//! [`HeadlessInputGate`] that tracks state and warns once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::application::ports::{GateError, InputGate};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// State-only gate for platforms without a suppression backend.
#[derive(Default)]
pub struct HeadlessInputGate {
    blocked: AtomicBool,
    warned: AtomicBool,
}

impl HeadlessInputGate {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputGate for HeadlessInputGate {
    fn set_input_blocked(&self, blocked: bool) -> Result<(), GateError> {
        if blocked && !self.warned.swap(true, Ordering::SeqCst) {
            warn!("input suppression is not supported on this platform; lock is visual only");
        }
        self.blocked.store(blocked, Ordering::SeqCst);
        Ok(())
    }

    fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }
}

/// Returns the input gate for the current platform.
pub fn native_input_gate() -> Arc<dyn InputGate> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsInputGate::new())
    }
    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(HeadlessInputGate::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
