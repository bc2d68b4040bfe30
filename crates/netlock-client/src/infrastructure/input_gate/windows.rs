//! Windows input gate built on low-level keyboard and mouse hooks.
//!
//! Blocking installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` hooks on a dedicated
//! Win32 message-loop thread.  Both hook procedures consume every event
//! (return `LRESULT(1)`), so nothing reaches the desktop.  Unblocking posts
//! `WM_QUIT` to that thread, which removes the hooks and exits.
//!
//! The secure attention sequence (Ctrl+Alt+Del) cannot be intercepted by
//! user-mode hooks.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, MSG, PM_NOREMOVE, WH_KEYBOARD_LL,
    WH_MOUSE_LL, WM_QUIT, WM_USER,
};

use crate::application::ports::{GateError, InputGate};

/// A running hook thread.
struct HookThread {
    thread_id: u32,
    handle: JoinHandle<()>,
}

/// Suppresses all local keyboard and mouse input while blocked.
#[derive(Default)]
pub struct WindowsInputGate {
    active: Mutex<Option<HookThread>>,
}

impl WindowsInputGate {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputGate for WindowsInputGate {
    fn set_input_blocked(&self, blocked: bool) -> Result<(), GateError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match (blocked, active.is_some()) {
            (true, false) => {
                *active = Some(spawn_hook_thread()?);
                debug!("input suppression hooks installed");
                Ok(())
            }
            (false, true) => {
                if let Some(hook) = active.take() {
                    stop_hook_thread(hook)?;
                    debug!("input suppression hooks removed");
                }
                Ok(())
            }
            // Already in the requested state.
            _ => Ok(()),
        }
    }

    fn is_blocked(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Drop for WindowsInputGate {
    fn drop(&mut self) {
        if let Some(hook) = self
            .active
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            if let Err(e) = stop_hook_thread(hook) {
                warn!("failed to remove input hooks on drop: {e}");
            }
        }
    }
}

/// Spawns the hook thread and waits until both hooks are installed.
fn spawn_hook_thread() -> Result<HookThread, GateError> {
    let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();

    let handle = thread::Builder::new()
        .name("netlock-input-gate".to_string())
        .spawn(move || run_hook_message_loop(ready_tx))
        .map_err(|e| GateError::HookInstall(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(thread_id)) => Ok(HookThread { thread_id, handle }),
        Ok(Err(reason)) => {
            let _ = handle.join();
            Err(GateError::HookInstall(reason))
        }
        Err(_) => {
            let _ = handle.join();
            Err(GateError::HookInstall("hook thread exited before reporting".into()))
        }
    }
}

fn stop_hook_thread(hook: HookThread) -> Result<(), GateError> {
    // SAFETY: thread_id belongs to a live thread that owns a message queue
    // (created by PeekMessageW before it reported ready).
    unsafe { PostThreadMessageW(hook.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
        .map_err(|e| GateError::HookRemove(e.to_string()))?;
    hook.handle
        .join()
        .map_err(|_| GateError::HookRemove("hook thread panicked".into()))
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: mpsc::Sender<Result<u32, String>>) {
    let mut msg = MSG::default();

    // SAFETY: forces creation of this thread's message queue so that
    // PostThreadMessageW from the owner cannot fail with "no queue".
    unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    // SAFETY: SetWindowsHookExW requires the calling thread to pump messages,
    // which the loop below does until WM_QUIT.
    let kbd_hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(block_hook_proc), None, 0) } {
        Ok(h) => h,
        Err(e) => {
            let _ = ready.send(Err(format!("WH_KEYBOARD_LL: {e}")));
            return;
        }
    };
    // SAFETY: as above.
    let mouse_hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(block_hook_proc), None, 0) } {
        Ok(h) => h,
        Err(e) => {
            // SAFETY: kbd_hook was returned by SetWindowsHookExW on this thread.
            unsafe {
                let _ = UnhookWindowsHookEx(kbd_hook);
            }
            let _ = ready.send(Err(format!("WH_MOUSE_LL: {e}")));
            return;
        }
    };

    // SAFETY: GetCurrentThreadId has no preconditions.
    let _ = ready.send(Ok(unsafe { GetCurrentThreadId() }));

    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    // GetMessageW returns 0 on WM_QUIT and -1 on error; both end the loop.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            DispatchMessageW(&msg);
        }
        let _ = UnhookWindowsHookEx(kbd_hook);
        let _ = UnhookWindowsHookEx(mouse_hook);
    }
}

/// Shared keyboard and mouse hook procedure: swallows every event.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly.
unsafe extern "system" fn block_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: Must call CallNextHookEx when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }
    LRESULT(1)
}
