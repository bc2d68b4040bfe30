//! Application layer for the netlock client.
//!
//! Use cases orchestrate the domain engine from `netlock-core` and the
//! infrastructure adapters through the capability traits in [`ports`]:
//!
//! - [`reconcile_tick`]: one poll-and-reconcile cycle, applied to the
//!   input gate, overlay, and power control.
//! - [`scheduler`]: runs ticks at the poll interval and fails open on exit.

pub mod ports;
pub mod reconcile_tick;
pub mod scheduler;
