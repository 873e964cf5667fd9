//! Process table access
//!
//! Everything the rest of the crate knows about live processes goes through
//! the [`ProcessTable`] trait. Lookups return [`LiveProcess`] snapshots that are
//! captured on demand and dropped right after use, since the process behind a
//! pid may exit or be replaced during any multi-second wait.

use crate::window::WindowHandle;
use tokio::time::{sleep, Duration, Instant};

/// Interval between liveness checks while waiting for a process to exit
pub const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Point-in-time view of an operating-system process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveProcess {
    pub pid: u32,
    pub name: String,
    pub parent: Option<u32>,
    /// Top-level window presented to the user, if any
    pub main_window: Option<WindowHandle>,
    /// Execution threads owned by the process
    pub threads: Vec<u32>,
}

/// Why a kill request did not go through
#[derive(Debug, thiserror::Error)]
pub enum KillError {
    #[error("process {0} no longer exists")]
    NotFound(u32),
    #[error("the operating system refused to terminate process {0}")]
    Refused(u32),
    #[error("process tree rooted at {pid} could not be terminated: {reason}")]
    Tree { pid: u32, reason: String },
}

/// Lookup and kill primitives over the live process table
pub trait ProcessTable {
    /// All live processes whose name matches `name` (see [`process_name_matches`])
    fn find_by_name(&self, name: &str) -> Vec<LiveProcess>;

    /// The live process with the given pid
    fn find_by_pid(&self, pid: u32) -> Option<LiveProcess>;

    /// Unconditionally terminate a single process
    fn kill(&self, pid: u32) -> Result<(), KillError>;

    /// Terminate a process together with all of its descendants
    fn kill_tree(&self, pid: u32) -> Result<(), KillError>;

    fn is_alive(&self, pid: u32) -> bool {
        self.find_by_pid(pid).is_some()
    }
}

/// Compare a live process name against an expected one.
///
/// Matching is case-insensitive and ignores a trailing `.exe` on either side,
/// so `notepad` matches `Notepad.exe`.
pub fn process_name_matches(actual: &str, expected: &str) -> bool {
    strip_exe(actual).eq_ignore_ascii_case(strip_exe(expected))
}

fn strip_exe(name: &str) -> &str {
    let name = name.trim();
    match name.len().checked_sub(4) {
        Some(split)
            if name.is_char_boundary(split) && name[split..].eq_ignore_ascii_case(".exe") =>
        {
            &name[..split]
        }
        _ => name,
    }
}

/// Wait until `pid` has left the process table, polling every
/// [`EXIT_POLL_INTERVAL`]. Returns false if it is still alive at the deadline.
pub async fn wait_for_exit<T: ProcessTable + ?Sized>(table: &T, pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if !table.is_alive(pid) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(EXIT_POLL_INTERVAL.min(deadline - now)).await;
    }
}
