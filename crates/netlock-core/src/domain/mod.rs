//! Domain entities for netlock.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.  Nothing here performs I/O: the reconciler is handed the
//! outcome of the network call and returns a decision, which makes every
//! temporal rule (countdown decay, reconnection backoff, notice edges)
//! testable with plain unit tests.

/// Time-remaining notices and their human-readable text.
pub mod notice;

/// The poll-and-reconcile state machine.
///
/// See [`reconcile::Reconciler`] for the main type.
pub mod reconcile;

/// Session state, poll configuration, and the per-tick poll result.
pub mod session;
