//! Infrastructure layer for the client.
//!
//! Contains the OS-facing adapters behind the capability traits in
//! `application::ports`.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `netlock_core`, but MUST NOT be imported by the `application` layer
//! outside of tests.
//!
//! # Sub-modules
//!
//! - **`identity`** – MAC address of the first allow-listed interface.
//! - **`network`** – `reqwest` client for `GET /api/status/{identity}`.
//! - **`input_gate`** – keyboard and mouse suppression.  The backend is
//!   selected at compile time with `#[cfg(target_os)]`; a recording mock is
//!   provided for tests and `--dry-run`.
//! - **`overlay`** – lock screen and notifications on a dedicated UI thread.
//! - **`power`** – remote shutdown and restart.
//! - **`storage`** – `settings.conf` loading and first-run defaults.
//! - **`logging`** – stderr and file sinks for `tracing`.

pub mod identity;
pub mod input_gate;
pub mod logging;
pub mod network;
pub mod overlay;
pub mod power;
pub mod storage;
