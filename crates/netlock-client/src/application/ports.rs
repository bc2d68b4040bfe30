//! Capability traits the application layer depends on.
//!
//! Each trait is implemented in the infrastructure layer (HTTP, OS hooks,
//! UI thread, power commands) and by recording mocks for tests.  The
//! application layer only ever sees these traits, never the OS APIs.

use async_trait::async_trait;
use netlock_core::{FetchError, PowerAction, StatusResponse};
use thiserror::Error;

/// Error type for identity resolution.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The OS refused to enumerate network interfaces.
    #[error("failed to enumerate network interfaces: {0}")]
    Enumerate(#[source] std::io::Error),
    /// An interface allow-list entry is not a valid regular expression.
    #[error("invalid interface pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Error type for input gate operations.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("failed to install input hook: {0}")]
    HookInstall(String),
    #[error("failed to remove input hook: {0}")]
    HookRemove(String),
}

/// Error type for power control operations.
#[derive(Debug, Error)]
pub enum PowerError {
    #[error("failed to run power command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves the machine identity (MAC addresses) used as the server key.
pub trait IdentityResolver: Send + Sync {
    /// Returns every matching address; the first one is the identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if interfaces cannot be enumerated.
    fn resolve(&self) -> Result<Vec<String>, IdentityError>;
}

/// Performs one status request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches `GET {base}/api/status/{identity}`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`]; the caller decides whether it
    /// means degraded mode or an unregistered identity.
    async fn fetch_status(&self, identity: &str) -> Result<StatusResponse, FetchError>;
}

/// Blocks or unblocks local keyboard and mouse input.
pub trait InputGate: Send + Sync {
    /// Idempotent: blocking twice installs the suppression hooks once.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] if the OS hook cannot be installed or removed.
    fn set_input_blocked(&self, blocked: bool) -> Result<(), GateError>;

    /// Returns the state last applied.
    fn is_blocked(&self) -> bool;
}

/// Shows the lock overlay and user notifications.
pub trait OverlayPresenter: Send + Sync {
    fn set_overlay_visible(&self, visible: bool);
    fn show_time_notice(&self, remaining_minutes: u64);
    /// Short-lived error notification (e.g. "couldn't connect to server").
    fn notify_error(&self, title: &str, message: &str);
    /// Hides the overlay and releases UI resources.  Further calls are no-ops.
    fn teardown(&self);
}

/// Executes remote power commands.
pub trait PowerControl: Send + Sync {
    /// Fire-and-forget: returns once the OS command has been started.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError`] if the command could not be spawned.
    fn execute(&self, action: PowerAction) -> Result<(), PowerError>;
}
