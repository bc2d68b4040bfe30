//! Remote power commands.
//!
//! [`SystemPowerControl`] starts the OS `shutdown` command and returns
//! immediately; it does not wait for the machine to go down.

use std::process::{Command, Stdio};

use netlock_core::PowerAction;
use tracing::warn;

use crate::application::ports::{PowerControl, PowerError};

pub mod mock;

/// Runs the platform `shutdown` command.
#[derive(Debug, Default)]
pub struct SystemPowerControl;

impl SystemPowerControl {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "windows")]
const SHUTDOWN_ARGS: &[&str] = &["-t", "0", "-f"];
#[cfg(target_os = "windows")]
const RESTART_ARGS: &[&str] = &["-t", "0", "-f", "-r"];
#[cfg(not(target_os = "windows"))]
const SHUTDOWN_ARGS: &[&str] = &["-h", "now"];
#[cfg(not(target_os = "windows"))]
const RESTART_ARGS: &[&str] = &["-r", "now"];

/// Returns the program and arguments for `action` on this platform.
pub fn power_command(action: PowerAction) -> (&'static str, &'static [&'static str]) {
    match action {
        PowerAction::Shutdown => ("shutdown", SHUTDOWN_ARGS),
        PowerAction::Restart => ("shutdown", RESTART_ARGS),
    }
}

impl PowerControl for SystemPowerControl {
    fn execute(&self, action: PowerAction) -> Result<(), PowerError> {
        let (program, args) = power_command(action);
        let command = format!("{program} {}", args.join(" "));
        warn!(%command, "executing remote power command");

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|source| PowerError::Spawn { command, source })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "windows")]
    fn test_windows_commands_are_forced_and_immediate() {
        assert_eq!(
            power_command(PowerAction::Shutdown),
            ("shutdown", &["-t", "0", "-f"][..])
        );
        assert_eq!(
            power_command(PowerAction::Restart),
            ("shutdown", &["-t", "0", "-f", "-r"][..])
        );
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_unix_commands_are_immediate() {
        assert_eq!(power_command(PowerAction::Shutdown), ("shutdown", &["-h", "now"][..]));
        assert_eq!(power_command(PowerAction::Restart), ("shutdown", &["-r", "now"][..]));
    }
}
