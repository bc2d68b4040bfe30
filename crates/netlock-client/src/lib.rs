//! netlock-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does netlock-client do? (for beginners)
//!
//! The client runs on a kiosk or lab machine whose usage time is managed by
//! a central lock server.  Every few seconds it:
//!
//! 1. Works out the machine's identity (the MAC address of an allow-listed
//!    network interface).
//! 2. Asks the server `GET /api/status/{identity}` whether the machine is
//!    locked and how much time is left.
//! 3. Feeds the answer (or the failure) to the reconciliation engine from
//!    `netlock-core`, which decides what the machine should look like now.
//! 4. Applies that decision: blocks or releases keyboard and mouse, shows or
//!    hides the lock overlay, pops a time notice, and runs a remote
//!    shutdown or restart if one was requested.
//!
//! When the server is unreachable the engine keeps counting the remaining
//! time down locally, so cutting the network cable does not buy free time.

/// Application layer: capability ports, the tick use case, and the scheduler.
pub mod application;

/// Infrastructure layer: OS adapters, HTTP, configuration, and logging.
pub mod infrastructure;
