//! `settings.conf` persistence for the client.
//!
//! The file lives in the directory passed with `--path` and uses one
//! `key=value` pair per line:
//!
//! ```text
//! ip=http://10.0.0.2:3000
//! interval=5
//! initial_time=120
//! interfaces=[^Ethernet$, ^Wi-Fi]
//! ```
//!
//! # How values are typed
//!
//! Each raw value is converted to a `toml::Value` first, then the whole
//! table is deserialized into [`AppConfig`] with serde:
//!
//! | Raw text                 | Becomes        |
//! |--------------------------|----------------|
//! | `true` / `False`         | boolean        |
//! | `42`                     | integer        |
//! | `1.5` or `1,5`           | float          |
//! | `[a, b]`                 | array (items typed the same way) |
//! | `None`                   | key is skipped |
//! | anything else            | string         |
//!
//! Lines starting with `#` are comments.  Lines that are not exactly one
//! `key=value` pair are reported back in [`LoadedConfig::rejected_lines`]
//! so the caller can log them once logging is up.
//!
//! Both `snake_case` and `camelCase` keys are accepted via `#[serde(alias)]`.
//! When the file does not exist it is created with every default written out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use netlock_core::{NoticePolicy, PollConfig};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// File name inside the configuration directory.
pub const SETTINGS_FILE: &str = "settings.conf";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value has the wrong type for its key.
    #[error("invalid value in config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A duration that must be positive was set to zero.
    #[error("'{key}' must be at least 1 second")]
    ZeroDuration { key: &'static str },

    /// No server address configured.
    #[error("no server address ('ip') set in {path}")]
    MissingIp { path: PathBuf },
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// Client configuration as stored in `settings.conf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL of the lock server, e.g. `http://10.0.0.2:3000`.
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub ip: Option<String>,
    /// Seconds between ticks.
    #[serde(default = "default_interval", alias = "poll_interval")]
    pub interval: u64,
    /// Budget assumed before the server has ever answered.
    #[serde(default = "default_initial_time", alias = "initialTime")]
    pub initial_time: u64,
    /// Seconds of degraded mode before the server is tried again.
    #[serde(default = "default_reconnection_time", alias = "reconnectionTime")]
    pub reconnection_time: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_connection_timeout", alias = "connectionTimeout")]
    pub connection_timeout: u64,
    /// Interface name allow-list (regular expressions).
    #[serde(default = "default_interfaces")]
    pub interfaces: Vec<String>,
    /// Directory for `{name}.logs`.
    #[serde(default = "default_logs_path", alias = "logsPath", deserialize_with = "scalar_string")]
    pub logs_path: String,
    /// Extra delay after identity or registration errors.
    #[serde(default = "default_error_cooldown", alias = "errorCooldown")]
    pub error_cooldown: u64,
    /// Degraded ticks during which the time notice stays up.
    #[serde(default = "default_notice_ticks", alias = "noticeTicks")]
    pub notice_ticks: u64,
    /// Remaining seconds at which a degraded-mode reminder is shown.
    #[serde(default = "default_reminder_threshold", alias = "reminderThreshold")]
    pub reminder_threshold: u64,
    #[serde(default = "default_version", deserialize_with = "scalar_string")]
    pub version: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_interval() -> u64 {
    5
}
fn default_initial_time() -> u64 {
    120
}
fn default_reconnection_time() -> u64 {
    300
}
fn default_connection_timeout() -> u64 {
    3
}
fn default_interfaces() -> Vec<String> {
    vec!["^Ethernet$".to_string()]
}
fn default_logs_path() -> String {
    "./logs".to_string()
}
fn default_error_cooldown() -> u64 {
    5
}
fn default_notice_ticks() -> u64 {
    NoticePolicy::default().degraded_ticks
}
fn default_reminder_threshold() -> u64 {
    NoticePolicy::default().reminder_threshold_secs
}
fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ip: None,
            interval: default_interval(),
            initial_time: default_initial_time(),
            reconnection_time: default_reconnection_time(),
            connection_timeout: default_connection_timeout(),
            interfaces: default_interfaces(),
            logs_path: default_logs_path(),
            error_cooldown: default_error_cooldown(),
            notice_ticks: default_notice_ticks(),
            reminder_threshold: default_reminder_threshold(),
            version: default_version(),
        }
    }
}

/// A version like `2` or an address like `1.5` is typed as a number by the
/// value parser; accept it back as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Scalar::deserialize(d).map(Scalar::into_string)
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Some(scalar_string(d)?).filter(|s| !s.trim().is_empty()))
}

impl AppConfig {
    /// Returns the server address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingIp`] when `ip` is absent; the client
    /// cannot run without it.
    pub fn require_ip(&self, dir: &Path) -> Result<&str, ConfigError> {
        self.ip.as_deref().ok_or_else(|| ConfigError::MissingIp {
            path: dir.join(SETTINGS_FILE),
        })
    }

    /// Checks values serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] when `interval` or
    /// `connection_timeout` is zero: a zero step would freeze the degraded
    /// countdown and spin the scheduler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("interval", self.interval),
            ("connection_timeout", self.connection_timeout),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { key });
            }
        }
        Ok(())
    }

    /// Engine parameters derived from this config.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            poll_interval: self.interval,
            initial_time: self.initial_time,
            reconnection_backoff: self.reconnection_time,
            connection_timeout: self.connection_timeout,
            notice: NoticePolicy {
                degraded_ticks: self.notice_ticks,
                reminder_threshold_secs: self.reminder_threshold,
            },
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn error_cooldown(&self) -> Duration {
        Duration::from_secs(self.error_cooldown)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout)
    }

    /// Renders the config in `settings.conf` form.  `ip` is omitted when unset.
    pub fn to_settings_string(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ip) = &self.ip {
            lines.push(format!("ip={ip}"));
        }
        lines.push(format!("interval={}", self.interval));
        lines.push(format!("initial_time={}", self.initial_time));
        lines.push(format!("reconnection_time={}", self.reconnection_time));
        lines.push(format!("connection_timeout={}", self.connection_timeout));
        lines.push(format!("interfaces=[{}]", self.interfaces.join(", ")));
        lines.push(format!("logs_path={}", self.logs_path));
        lines.push(format!("error_cooldown={}", self.error_cooldown));
        lines.push(format!("notice_ticks={}", self.notice_ticks));
        lines.push(format!("reminder_threshold={}", self.reminder_threshold));
        lines.push(format!("version={}", self.version));
        lines.join("\n")
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Result of reading `settings.conf`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// Lines that were not a single `key=value` pair.
    pub rejected_lines: Vec<String>,
    /// `true` when the file did not exist and defaults were written.
    pub created: bool,
}

/// Parses `key=value` text into a config.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when a recognised key has a value of the
/// wrong type (e.g. `interval=fast`), and [`ConfigError::ZeroDuration`] when
/// a duration that drives the countdown is zero.
pub fn parse_settings(content: &str) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let mut table = toml::Table::new();
    let mut rejected = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('=').collect();
        let [key, raw] = parts.as_slice() else {
            rejected.push(line.to_string());
            continue;
        };
        if let Some(value) = type_value(raw.trim()) {
            table.insert(key.trim().to_string(), value);
        }
    }

    let config: AppConfig = toml::Value::Table(table).try_into()?;
    config.validate()?;
    Ok((config, rejected))
}

/// Types one raw value; `None` means "absent".
fn type_value(raw: &str) -> Option<toml::Value> {
    let lower = raw.to_ascii_lowercase();
    if lower == "true" || lower == "false" {
        return Some(toml::Value::Boolean(lower == "true"));
    }
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = raw.parse::<i64>() {
            return Some(toml::Value::Integer(i));
        }
    }
    if is_decimal(raw) {
        if let Ok(f) = raw.replace(',', ".").parse::<f64>() {
            return Some(toml::Value::Float(f));
        }
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| unquote(item.trim()))
            .filter(|item| !item.is_empty())
            .filter_map(type_value)
            .collect();
        return Some(toml::Value::Array(items));
    }
    if raw == "None" {
        return None;
    }
    Some(toml::Value::String(raw.to_string()))
}

fn is_decimal(raw: &str) -> bool {
    let mut separators = 0;
    let mut digits = 0;
    for c in raw.chars() {
        match c {
            '.' | ',' => separators += 1,
            c if c.is_ascii_digit() => digits += 1,
            _ => return false,
        }
    }
    separators == 1 && digits > 0
}

fn unquote(item: &str) -> &str {
    for q in ['\'', '"'] {
        if let Some(inner) = item.strip_prefix(q).and_then(|i| i.strip_suffix(q)) {
            return inner;
        }
    }
    item
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads `settings.conf` from `dir`, creating it with defaults if missing.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures and
/// [`ConfigError::Parse`] for mistyped values.
pub fn load_config(dir: &Path) -> Result<LoadedConfig, ConfigError> {
    let path = dir.join(SETTINGS_FILE);

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let (config, rejected_lines) = parse_settings(&content)?;
            Ok(LoadedConfig {
                config,
                rejected_lines,
                created: false,
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let config = AppConfig::default();
            save_config(dir, &config)?;
            Ok(LoadedConfig {
                config,
                rejected_lines: Vec::new(),
                created: true,
            })
        }
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

/// Writes `config` to `dir/settings.conf`, creating `dir` if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures.
pub fn save_config(dir: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(SETTINGS_FILE);
    std::fs::write(&path, config.to_settings_string())
        .map_err(|source| ConfigError::Io { path, source })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "netlock-config-{}-{}",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_matches_documented_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.ip, None);
        assert_eq!(cfg.interval, 5);
        assert_eq!(cfg.initial_time, 120);
        assert_eq!(cfg.reconnection_time, 300);
        assert_eq!(cfg.connection_timeout, 3);
        assert_eq!(cfg.interfaces, vec!["^Ethernet$"]);
        assert_eq!(cfg.logs_path, "./logs");
        assert_eq!(cfg.error_cooldown, 5);
    }

    #[test]
    fn test_default_settings_string_omits_missing_ip() {
        let text = AppConfig::default().to_settings_string();

        assert!(!text.contains("ip="));
        assert!(text.contains("interfaces=[^Ethernet$]"));
    }

    // ── Value typing ──────────────────────────────────────────────────────────

    #[test]
    fn test_type_value_recognises_each_kind() {
        assert_eq!(type_value("TRUE"), Some(toml::Value::Boolean(true)));
        assert_eq!(type_value("42"), Some(toml::Value::Integer(42)));
        assert_eq!(type_value("1,5"), Some(toml::Value::Float(1.5)));
        assert_eq!(type_value("None"), None);
        assert_eq!(
            type_value("http://10.0.0.2:3000"),
            Some(toml::Value::String("http://10.0.0.2:3000".into()))
        );
        assert_eq!(
            type_value("[a, 'b', 3]"),
            Some(toml::Value::Array(vec![
                toml::Value::String("a".into()),
                toml::Value::String("b".into()),
                toml::Value::Integer(3),
            ]))
        );
    }

    #[test]
    fn test_dotted_address_stays_a_string() {
        assert_eq!(
            type_value("10.0.0.2"),
            Some(toml::Value::String("10.0.0.2".into()))
        );
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_accepts_camel_case_keys() {
        // Arrange
        let content = "ip=http://srv:3000\ninitialTime=600\nconnectionTimeout=10\nlogsPath=C:/logs";

        // Act
        let (cfg, rejected) = parse_settings(content).unwrap();

        // Assert
        assert!(rejected.is_empty());
        assert_eq!(cfg.ip.as_deref(), Some("http://srv:3000"));
        assert_eq!(cfg.initial_time, 600);
        assert_eq!(cfg.connection_timeout, 10);
        assert_eq!(cfg.logs_path, "C:/logs");
        assert_eq!(cfg.interval, 5, "unspecified keys keep defaults");
    }

    #[test]
    fn test_parse_skips_comments_and_reports_bad_lines() {
        let content = "# comment\ninterval=10\nthis is not a pair\na=b=c";

        let (cfg, rejected) = parse_settings(content).unwrap();

        assert_eq!(cfg.interval, 10);
        assert_eq!(rejected, vec!["this is not a pair", "a=b=c"]);
    }

    #[test]
    fn test_parse_strips_quoted_list_items() {
        let (cfg, _) = parse_settings("interfaces=['^Ethernet$', '^Wi-Fi']").unwrap();

        assert_eq!(cfg.interfaces, vec!["^Ethernet$", "^Wi-Fi"]);
    }

    #[test]
    fn test_parse_numeric_version_becomes_text() {
        let (cfg, _) = parse_settings("version=2").unwrap();

        assert_eq!(cfg.version, "2");
    }

    #[test]
    fn test_parse_rejects_mistyped_value() {
        let result = parse_settings("interval=fast");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_zero_interval() {
        // Arrange / Act
        let result = parse_settings("ip=http://10.0.0.2:3000\ninterval=0");

        // Assert
        assert!(matches!(
            result,
            Err(ConfigError::ZeroDuration { key: "interval" })
        ));
    }

    #[test]
    fn test_parse_rejects_zero_connection_timeout() {
        let result = parse_settings("ip=http://10.0.0.2:3000\nconnectionTimeout=0");

        assert!(matches!(
            result,
            Err(ConfigError::ZeroDuration { key: "connection_timeout" })
        ));
    }

    #[test]
    fn test_load_zero_interval_file_fails() {
        // Arrange
        let dir = temp_dir("zero-interval");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(SETTINGS_FILE), "ip=http://10.0.0.2:3000\ninterval=0\n").unwrap();

        // Act
        let result = load_config(&dir);

        // Assert
        assert!(matches!(result, Err(ConfigError::ZeroDuration { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_poll_config_maps_every_field() {
        let (cfg, _) = parse_settings(
            "interval=10\ninitial_time=60\nreconnection_time=30\nconnection_timeout=4\nnotice_ticks=2\nreminder_threshold=120",
        )
        .unwrap();

        let poll = cfg.poll_config();

        assert_eq!(poll.poll_interval, 10);
        assert_eq!(poll.initial_time, 60);
        assert_eq!(poll.reconnection_backoff, 30);
        assert_eq!(poll.connection_timeout, 4);
        assert_eq!(poll.notice.degraded_ticks, 2);
        assert_eq!(poll.notice.reminder_threshold_secs, 120);
    }

    #[test]
    fn test_require_ip_fails_when_absent() {
        let dir = PathBuf::from("/etc/netlock");

        let err = AppConfig::default().require_ip(&dir).unwrap_err();

        assert!(matches!(err, ConfigError::MissingIp { path } if path.ends_with(SETTINGS_FILE)));
    }

    // ── Repository ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_file_writes_defaults() {
        // Arrange
        let dir = temp_dir("missing");

        // Act
        let loaded = load_config(&dir).unwrap();

        // Assert
        assert!(loaded.created);
        assert_eq!(loaded.config, AppConfig::default());
        let written = std::fs::read_to_string(dir.join(SETTINGS_FILE)).unwrap();
        assert_eq!(written, AppConfig::default().to_settings_string());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = temp_dir("saved");
        let cfg = AppConfig {
            ip: Some("http://10.0.0.2:3000".into()),
            interval: 7,
            interfaces: vec!["^Ethernet".into(), "^eth".into()],
            ..AppConfig::default()
        };

        save_config(&dir, &cfg).unwrap();
        let loaded = load_config(&dir).unwrap();

        assert!(!loaded.created);
        assert_eq!(loaded.config, cfg);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
