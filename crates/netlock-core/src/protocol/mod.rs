//! Wire types for the status endpoint.
//!
//! The client speaks exactly one request: `GET {ip}/api/status/{identity}`.
//! [`status::StatusResponse`] mirrors the JSON body and
//! [`status::FetchError`] classifies everything that can go wrong while
//! obtaining it.

pub mod status;
