//! Cooperative shutdown of a single process

use super::{WindowHandle, WindowSystem};
use crate::process::{wait_for_exit, ProcessTable};
use std::collections::BTreeSet;
use tokio::time::Duration;
use tracing::debug;

/// Asks a process to close itself through its windows.
///
/// The messenger never kills anything. A window that never responds is an
/// expected outcome and simply yields `false`.
pub struct WindowMessenger<'a, W: ?Sized, T: ?Sized> {
    windows: &'a W,
    table: &'a T,
}

impl<'a, W, T> WindowMessenger<'a, W, T>
where
    W: WindowSystem + ?Sized,
    T: ProcessTable + ?Sized,
{
    pub fn new(windows: &'a W, table: &'a T) -> Self {
        Self { windows, table }
    }

    /// Request `pid` to close and wait up to `timeout` for it to exit.
    ///
    /// The main window is asked first. If there is none, or the process is
    /// still alive after `timeout`, every top-level window of every thread of
    /// the process is asked as well. Returns true only once the process has
    /// actually exited.
    pub async fn close(&self, pid: u32, timeout: Duration) -> bool {
        let Some(process) = self.table.find_by_pid(pid) else {
            debug!(pid, "Process already exited before close request");
            return true;
        };

        if let Some(window) = process.main_window {
            if self.windows.post_close(window) {
                debug!(pid, window = window.0, "Close request posted to main window");
                if wait_for_exit(self.table, pid, timeout).await {
                    return true;
                }
                debug!(pid, "Main window close not honoured within {:?}", timeout);
            }
        }

        // Thread ids may have changed while we waited
        let Some(process) = self.table.find_by_pid(pid) else {
            return true;
        };

        let windows: BTreeSet<WindowHandle> = process
            .threads
            .iter()
            .flat_map(|&tid| self.windows.thread_windows(tid))
            .collect();
        let posted = windows
            .iter()
            .filter(|&&window| self.windows.post_close(window))
            .count();

        if posted == 0 {
            debug!(pid, "No thread-owned windows accepted a close request");
            return !self.table.is_alive(pid);
        }

        debug!(pid, "Close request posted to {} thread window(s)", posted);
        wait_for_exit(self.table, pid, timeout).await
    }
}
