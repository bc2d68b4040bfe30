//! Status endpoint payload and fetch errors.
//!
//! Example body returned by the server for a registered machine:
//!
//! ```json
//! {
//!   "lockAfter": 1718000000000,
//!   "isLocked": false,
//!   "requestTime": 1717999100000,
//!   "remainingSeconds": 900,
//!   "timeInfo": false,
//!   "restart": false,
//!   "shutdown": false
//! }
//! ```
//!
//! Every field is optional on the wire.  Fields the client does not use
//! (`lockAfter`, `requestTime`) are ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::session::PollResult;

/// Errors that can occur while obtaining a status response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request did not complete within the connection timeout.
    #[error("status request timed out")]
    Timeout,
    /// The server could not be reached (DNS, refused, reset, TLS).
    #[error("could not connect to status server: {0}")]
    Connect(String),
    /// The server answered with a non-success status other than 404.
    #[error("status server returned HTTP {0}")]
    HttpStatus(u16),
    /// The body was not a JSON status object.
    #[error("malformed status payload: {0}")]
    Malformed(String),
    /// The server has no record for this identity (HTTP 404).
    #[error("identity not registered on the status server")]
    NotRegistered,
}

impl FetchError {
    /// Returns `true` for failures that mean "the server was not usable"
    /// and should push the client into degraded mode.
    ///
    /// [`FetchError::NotRegistered`] is the one exception: the server
    /// answered, it just does not know this machine.
    pub fn is_request_failure(&self) -> bool {
        !matches!(self, FetchError::NotRegistered)
    }
}

/// JSON body of `GET /api/status/{identity}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_info: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<bool>,
    /// Signed on the wire; negative values are clamped to zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
}

impl StatusResponse {
    /// Parses a response body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Malformed`] if the body is not a JSON object of
    /// the expected shape.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Converts the payload into a [`PollResult`].
    ///
    /// Returns `None` when `isLocked` is absent, which is how the server
    /// answers for an identity it has no record of.
    pub fn to_poll_result(&self) -> Option<PollResult> {
        let is_locked = self.is_locked?;
        Some(PollResult {
            is_locked,
            remaining_seconds: self.remaining_seconds.map(|s| s.max(0) as u64),
            show_time_notice: self.time_info.unwrap_or(false),
            shutdown: self.shutdown.unwrap_or(false),
            restart: self.restart.unwrap_or(false),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
