//! Recording power control for tests and `--dry-run`.
//!
//! Never touches the OS; every requested action is appended to a list.

use std::sync::Mutex;

use netlock_core::PowerAction;
use tracing::info;

use crate::application::ports::{PowerControl, PowerError};

#[derive(Default)]
pub struct RecordingPowerControl {
    executed: Mutex<Vec<PowerAction>>,
}

impl RecordingPowerControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> Vec<PowerAction> {
        self.executed.lock().unwrap().clone()
    }
}

impl PowerControl for RecordingPowerControl {
    fn execute(&self, action: PowerAction) -> Result<(), PowerError> {
        info!("dry run: would execute {action:?}");
        self.executed.lock().unwrap().push(action);
        Ok(())
    }
}
