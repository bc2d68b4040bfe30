//! # netlock-core
//!
//! Shared library for netlock containing the poll-and-reconcile state
//! machine, the per-process session state, and the status endpoint wire
//! types.
//!
//! It has zero dependencies on OS APIs, UI frameworks, or network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! netlock is a kiosk-lock client.  Every few seconds it asks a server
//! "is this machine locked, and how much time does it have left?" and then
//! blocks or unblocks the keyboard and mouse accordingly.  When the server
//! cannot be reached, the client keeps counting the remaining time down on
//! its own so an outage never hands out free time.
//!
//! This crate (`netlock-core`) is the pure decision-making part:
//!
//! - **`domain`** – [`SessionState`] (everything the client remembers
//!   between ticks), [`PollConfig`] (the timing policy), and the
//!   [`Reconciler`] that turns one server answer (or the lack of one) into a
//!   [`Decision`].
//!
//! - **`protocol`** – The JSON payload returned by `GET /api/status/{mac}`
//!   and the error taxonomy for fetching it.
//!
//! Everything with side effects (HTTP, hooks, overlay windows, shutdown
//! commands) lives in `netlock-client`.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `netlock_core::Reconciler` instead of `netlock_core::domain::reconcile::Reconciler`.
pub use domain::notice::{format_remaining, NoticeEvent};
pub use domain::reconcile::{Decision, LinkState, Reconciler, TickError, TickOutcome};
pub use domain::session::{NoticePolicy, PollConfig, PollResult, PowerAction, SessionState};
pub use protocol::status::{FetchError, StatusResponse};
