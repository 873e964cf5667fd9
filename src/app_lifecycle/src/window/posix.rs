//! POSIX stand-in for window messaging

use super::{WindowHandle, WindowSystem};
use nix::{
    sys::signal::{kill, Signal},
    unistd::Pid,
};
use tracing::debug;

/// Treats a process as its own single window and `SIGTERM` as the close request
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixWindows;

impl WindowSystem for PosixWindows {
    fn thread_windows(&self, _thread_id: u32) -> Vec<WindowHandle> {
        Vec::new()
    }

    fn post_close(&self, window: WindowHandle) -> bool {
        let Ok(raw) = i32::try_from(window.0) else {
            return false;
        };
        if raw <= 0 {
            // 0 and negative values address process groups
            return false;
        }
        match kill(Pid::from_raw(raw), Signal::SIGTERM) {
            Ok(()) => {
                debug!(pid = raw, "Sent SIGTERM");
                true
            }
            Err(e) => {
                debug!(pid = raw, "Failed to send SIGTERM: {}", e);
                false
            }
        }
    }
}
