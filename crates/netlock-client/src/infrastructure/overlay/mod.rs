//! Overlay presenter running on a dedicated UI thread.
//!
//! # Threading model
//!
//! Presenter calls arrive from the tokio runtime and must never block it, so
//! [`ThreadedOverlay`] forwards them over a `std::sync::mpsc` channel to a
//! thread named `netlock-ui` that owns the [`OverlaySurface`].  Each time the
//! UI thread wakes it drains everything queued:
//!
//! - visibility changes are coalesced, only the latest one is applied, and
//!   only if it differs from what is already on screen;
//! - every notice and error notification is delivered, in order.
//!
//! `teardown` hides the overlay, closes the surface, and joins the thread.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use netlock_core::NoticeEvent;
use tracing::{info, warn};

use crate::application::ports::OverlayPresenter;

pub mod mock;

/// Something that can draw the lock screen and notifications.
///
/// Implementations run on the UI thread only.
pub trait OverlaySurface: Send + 'static {
    fn show_lock_screen(&mut self);
    fn hide_lock_screen(&mut self);
    fn show_notification(&mut self, title: &str, body: &str);
    fn close(&mut self);
}

/// Surface that renders to the log.  Used where no windowing backend exists.
#[derive(Debug, Default)]
pub struct LogSurface;

impl OverlaySurface for LogSurface {
    fn show_lock_screen(&mut self) {
        info!("lock screen shown");
    }

    fn hide_lock_screen(&mut self) {
        info!("lock screen hidden");
    }

    fn show_notification(&mut self, title: &str, body: &str) {
        info!("[{title}] {body}");
    }

    fn close(&mut self) {}
}

enum UiCommand {
    SetVisible(bool),
    TimeNotice(u64),
    Error { title: String, message: String },
    Teardown,
}

/// Overlay presenter that forwards to a UI thread.
pub struct ThreadedOverlay {
    tx: Mutex<Option<Sender<UiCommand>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadedOverlay {
    /// Spawns the UI thread with `surface`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn<S: OverlaySurface>(surface: S) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("netlock-ui".to_string())
            .spawn(move || run_ui_loop(rx, surface))?;
        Ok(Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    fn send(&self, cmd: UiCommand) {
        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = guard.as_ref() {
            if tx.send(cmd).is_err() {
                warn!("overlay thread is gone; dropping UI command");
            }
        }
    }
}

impl OverlayPresenter for ThreadedOverlay {
    fn set_overlay_visible(&self, visible: bool) {
        self.send(UiCommand::SetVisible(visible));
    }

    fn show_time_notice(&self, remaining_minutes: u64) {
        self.send(UiCommand::TimeNotice(remaining_minutes));
    }

    fn notify_error(&self, title: &str, message: &str) {
        self.send(UiCommand::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn teardown(&self) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(tx) = tx else {
            return;
        };
        let _ = tx.send(UiCommand::Teardown);
        drop(tx);

        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("overlay thread panicked during teardown");
            }
        }
    }
}

impl Drop for ThreadedOverlay {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn run_ui_loop<S: OverlaySurface>(rx: Receiver<UiCommand>, mut surface: S) {
    let mut visible = false;

    while let Ok(first) = rx.recv() {
        let mut target = None;
        let mut teardown = false;

        for cmd in std::iter::once(first).chain(rx.try_iter()) {
            match cmd {
                UiCommand::SetVisible(v) => target = Some(v),
                UiCommand::TimeNotice(minutes) => {
                    let notice = NoticeEvent {
                        remaining_minutes: minutes,
                    };
                    surface.show_notification("Time notice", &notice.message());
                }
                UiCommand::Error { title, message } => surface.show_notification(&title, &message),
                UiCommand::Teardown => teardown = true,
            }
        }

        if let Some(v) = target {
            if v != visible {
                if v {
                    surface.show_lock_screen();
                } else {
                    surface.hide_lock_screen();
                }
                visible = v;
            }
        }

        if teardown {
            break;
        }
    }

    // Teardown or every sender dropped.
    if visible {
        surface.hide_lock_screen();
    }
    surface.close();
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Drawn {
        Show,
        Hide,
        Note(String, String),
        Close,
    }

    #[derive(Clone, Default)]
    struct RecordingSurface(Arc<Mutex<Vec<Drawn>>>);

    impl OverlaySurface for RecordingSurface {
        fn show_lock_screen(&mut self) {
            self.0.lock().unwrap().push(Drawn::Show);
        }
        fn hide_lock_screen(&mut self) {
            self.0.lock().unwrap().push(Drawn::Hide);
        }
        fn show_notification(&mut self, title: &str, body: &str) {
            self.0
                .lock()
                .unwrap()
                .push(Drawn::Note(title.to_string(), body.to_string()));
        }
        fn close(&mut self) {
            self.0.lock().unwrap().push(Drawn::Close);
        }
    }

    #[test]
    fn test_every_notice_is_delivered_in_order() {
        // Arrange
        let surface = RecordingSurface::default();
        let log = surface.0.clone();
        let overlay = ThreadedOverlay::spawn(surface).unwrap();

        // Act
        overlay.show_time_notice(4);
        overlay.notify_error("REQUEST ERROR", "Couldn't connect to server");
        overlay.show_time_notice(0);
        overlay.teardown();

        // Assert
        let drawn = log.lock().unwrap().clone();
        let notes: Vec<_> = drawn
            .iter()
            .filter_map(|d| match d {
                Drawn::Note(_, body) => Some(body.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            notes,
            vec![
                "Time remaining: 4 minutes".to_string(),
                "Couldn't connect to server".to_string(),
                "Time remaining: less than 1 minute".to_string(),
            ]
        );
        assert_eq!(drawn.last(), Some(&Drawn::Close));
    }

    #[test]
    fn test_visibility_never_repeats_and_teardown_hides() {
        let surface = RecordingSurface::default();
        let log = surface.0.clone();
        let overlay = ThreadedOverlay::spawn(surface).unwrap();

        for v in [true, true, false, true, true] {
            overlay.set_overlay_visible(v);
        }
        overlay.teardown();

        let drawn = log.lock().unwrap().clone();
        let toggles: Vec<_> = drawn
            .iter()
            .filter(|d| matches!(d, Drawn::Show | Drawn::Hide))
            .cloned()
            .collect();
        // Coalescing may skip intermediate states, but show/hide strictly
        // alternate, and the final state before close is hidden.
        assert!(toggles.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(toggles.first(), Some(&Drawn::Show));
        assert_eq!(toggles.last(), Some(&Drawn::Hide));
        assert_eq!(drawn.last(), Some(&Drawn::Close));
    }

    #[test]
    fn test_teardown_is_idempotent_and_silences_later_calls() {
        let surface = RecordingSurface::default();
        let log = surface.0.clone();
        let overlay = ThreadedOverlay::spawn(surface).unwrap();

        overlay.teardown();
        overlay.teardown();
        overlay.set_overlay_visible(true);

        assert_eq!(*log.lock().unwrap(), vec![Drawn::Close]);
    }
}
