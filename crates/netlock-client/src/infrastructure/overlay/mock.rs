//! Recording overlay presenter for tests and `--dry-run`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::application::ports::OverlayPresenter;

/// One call made to the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCall {
    SetVisible(bool),
    TimeNotice(u64),
    Error { title: String, message: String },
    Teardown,
}

/// Records every presenter call in order.
#[derive(Default)]
pub struct RecordingOverlay {
    calls: Mutex<Vec<OverlayCall>>,
    visible: AtomicBool,
    torn_down: AtomicBool,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<OverlayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn record(&self, call: OverlayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl OverlayPresenter for RecordingOverlay {
    fn set_overlay_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
        self.record(OverlayCall::SetVisible(visible));
    }

    fn show_time_notice(&self, remaining_minutes: u64) {
        self.record(OverlayCall::TimeNotice(remaining_minutes));
    }

    fn notify_error(&self, title: &str, message: &str) {
        self.record(OverlayCall::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn teardown(&self) {
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            self.visible.store(false, Ordering::SeqCst);
            self.record(OverlayCall::Teardown);
        }
    }
}
