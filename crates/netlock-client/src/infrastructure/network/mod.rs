//! HTTP status client.
//!
//! Performs `GET {base}/api/status/{identity}` with a bounded timeout and
//! classifies every outcome into a [`FetchError`]:
//!
//! | Outcome                         | Result                         |
//! |---------------------------------|--------------------------------|
//! | 2xx with a JSON object          | `Ok(StatusResponse)`           |
//! | 404                             | `FetchError::NotRegistered`    |
//! | any other status                | `FetchError::HttpStatus(code)` |
//! | timeout                         | `FetchError::Timeout`          |
//! | connect / transport failure     | `FetchError::Connect(..)`      |
//! | body is not a JSON object       | `FetchError::Malformed(..)`    |
//!
//! No retries: one tick, at most one request.

use std::time::Duration;

use async_trait::async_trait;
use netlock_core::{FetchError, StatusResponse};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::application::ports::StatusSource;

/// Errors building the HTTP client.
#[derive(Debug, Error)]
pub enum StatusClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Status source backed by the lock server's REST API.
#[derive(Clone)]
pub struct HttpStatusClient {
    http: Client,
    base_url: String,
}

impl HttpStatusClient {
    /// Creates a client for `base_url` (e.g. `http://10.0.0.2:3000`).
    ///
    /// A bare `host:port` is treated as `http://host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusClientError::Build`] if the TLS backend fails to
    /// initialise.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StatusClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn status_url(&self, identity: &str) -> String {
        format!("{}/api/status/{}", self.base_url, identity)
    }
}

#[async_trait]
impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self, identity: &str) -> Result<StatusResponse, FetchError> {
        let url = self.status_url(identity);
        debug!(%url, "requesting status");

        let res = self.http.get(&url).send().await.map_err(classify)?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotRegistered);
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = res.text().await.map_err(classify)?;
        StatusResponse::from_json(&body)
    }
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Connect(err.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned HTTP response and returns the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> HttpStatusClient {
        HttpStatusClient::new(base, Duration::from_secs(3)).unwrap()
    }

    #[test]
    fn test_status_url_trims_trailing_slash_and_adds_scheme() {
        let c = client("10.0.0.2:3000/");

        assert_eq!(
            c.status_url("AA:BB"),
            "http://10.0.0.2:3000/api/status/AA:BB"
        );
    }

    #[test]
    fn test_status_url_keeps_explicit_scheme() {
        let c = client("https://lock.example.org");

        assert_eq!(
            c.status_url("X"),
            "https://lock.example.org/api/status/X"
        );
    }

    #[tokio::test]
    async fn test_ok_response_is_parsed() {
        let base = serve_once(
            "200 OK",
            r#"{"isLocked":false,"remainingSeconds":9000,"lockAfter":"2024-01-01"}"#,
        )
        .await;

        let response = client(&base).fetch_status("AA").await.unwrap();

        assert_eq!(response.is_locked, Some(false));
        assert_eq!(response.remaining_seconds, Some(9000));
    }

    #[tokio::test]
    async fn test_not_found_means_not_registered() {
        let base = serve_once(
            "404 Not Found",
            r#"{"code":404,"message":"Computer not found"}"#,
        )
        .await;

        let err = client(&base).fetch_status("AA").await.unwrap_err();

        assert_eq!(err, FetchError::NotRegistered);
    }

    #[tokio::test]
    async fn test_server_error_is_http_status() {
        let base = serve_once("500 Internal Server Error", "{}").await;

        let err = client(&base).fetch_status("AA").await.unwrap_err();

        assert_eq!(err, FetchError::HttpStatus(500));
        assert!(err.is_request_failure());
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let base = serve_once("200 OK", "<html>gateway</html>").await;

        let err = client(&base).fetch_status("AA").await.unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        // Port 1 is privileged and unused on test machines.
        let err = client("http://127.0.0.1:1").fetch_status("AA").await.unwrap_err();

        assert!(matches!(err, FetchError::Connect(_)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Arrange: accept the connection but never answer
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let c = HttpStatusClient::new(&format!("http://{addr}"), Duration::from_millis(200)).unwrap();

        // Act
        let err = c.fetch_status("AA").await.unwrap_err();

        // Assert
        assert_eq!(err, FetchError::Timeout);
    }
}
