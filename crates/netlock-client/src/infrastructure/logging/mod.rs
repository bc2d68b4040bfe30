//! Logging setup: stderr plus an append-only file sink.
//!
//! Both sinks share one `EnvFilter` (`RUST_LOG`, default `info`).  The file
//! sink is `{logs_dir}/{name}.logs`, written without ANSI colours through a
//! `tracing-appender` non-blocking writer.  Each process start appends a
//! separator line stamped with the local date and time, so sessions in the
//! append-only file can be told apart and dated.
//!
//! The returned [`WorkerGuard`] must be kept alive for the life of the
//! process; dropping it flushes and stops the background writer.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install global subscriber: {0}")]
    Configure(String),
}

/// Path of the log file for `name` inside `logs_dir`.
pub fn log_file_path(logs_dir: &Path, name: &str) -> PathBuf {
    logs_dir.join(format!("{name}.logs"))
}

/// Separator written at the start of each session.
pub fn session_separator(started: &str) -> String {
    format!("----- {started} -----")
}

/// Opens (creating if needed) the log file and appends a session separator.
///
/// # Errors
///
/// Returns [`LoggingError::Io`] if the directory or file cannot be created.
pub fn open_log_file(logs_dir: &Path, name: &str) -> Result<File, LoggingError> {
    let path = log_file_path(logs_dir, name);
    let io_err = |source| LoggingError::Io {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(logs_dir).map_err(io_err)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(io_err)?;
    let started = Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
    writeln!(file, "\n\n{}", session_separator(&started)).map_err(io_err)?;
    Ok(file)
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] if the log file cannot be opened or a global
/// subscriber is already installed.
pub fn init(logs_dir: &Path, name: &str) -> Result<WorkerGuard, LoggingError> {
    let file = open_log_file(logs_dir, name)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| LoggingError::Configure(e.to_string()))?;

    Ok(guard)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path_uses_name_and_extension() {
        let path = log_file_path(Path::new("/var/log/netlock"), "kiosk-7");

        assert_eq!(path, PathBuf::from("/var/log/netlock/kiosk-7.logs"));
    }

    #[test]
    fn test_session_separator_carries_start_time() {
        // Arrange
        let started = Local::now().format("%Y-%m-%d").to_string();

        // Act
        let dir = std::env::temp_dir().join(format!("netlock-logs-stamp-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        drop(open_log_file(&dir, "netlock").unwrap());
        let content = std::fs::read_to_string(log_file_path(&dir, "netlock")).unwrap();

        // Assert
        let line = content.lines().find(|l| l.starts_with("----- ")).unwrap();
        assert!(line.contains(&started), "separator {line:?} has no date");
        assert_eq!(session_separator("2026-01-02 03:04:05"), "----- 2026-01-02 03:04:05 -----");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_log_file_creates_directory_and_appends() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("netlock-logs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        // Act: two sessions
        drop(open_log_file(&dir, "netlock").unwrap());
        drop(open_log_file(&dir, "netlock").unwrap());

        // Assert
        let content = std::fs::read_to_string(log_file_path(&dir, "netlock")).unwrap();
        let separators: Vec<&str> = content.lines().filter(|l| l.starts_with("----- ")).collect();
        assert_eq!(separators.len(), 2);
        assert!(separators.iter().all(|l| l.ends_with(" -----")));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
