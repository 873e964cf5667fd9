//! Process table backed by `sysinfo`

use super::{
    table::{process_name_matches, KillError, LiveProcess, ProcessTable},
    tree::find_all_descendants,
};
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, warn};

/// Reads the live process table of the host.
///
/// Every call takes a fresh snapshot; nothing is cached between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

impl SystemProcessTable {
    pub fn new() -> Self {
        Self
    }

    fn snapshot() -> System {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        );
        sys
    }

    /// Snapshot including command lines, which are comparatively expensive to read
    #[cfg(windows)]
    pub(crate) fn snapshot_with_cmdlines() -> System {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always),
        );
        sys
    }
}

/// Zombies have exited and only wait to be reaped; treat them as gone.
pub(crate) fn is_live(process: &Process) -> bool {
    !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
}

fn to_live_process(pid: Pid, process: &Process) -> LiveProcess {
    let pid = pid.as_u32();
    LiveProcess {
        pid,
        name: process.name().to_string_lossy().into_owned(),
        parent: process.parent().map(|p| p.as_u32()),
        main_window: main_window(pid),
        threads: thread_ids(pid, process),
    }
}

#[cfg(windows)]
fn main_window(pid: u32) -> Option<crate::window::WindowHandle> {
    crate::window::win32::find_main_window(pid)
}

/// On POSIX hosts the process itself is the target of the close request.
#[cfg(unix)]
fn main_window(pid: u32) -> Option<crate::window::WindowHandle> {
    Some(crate::window::WindowHandle(pid as isize))
}

#[cfg(not(any(windows, unix)))]
fn main_window(_pid: u32) -> Option<crate::window::WindowHandle> {
    None
}

#[cfg(windows)]
fn thread_ids(pid: u32, _process: &Process) -> Vec<u32> {
    crate::window::win32::process_thread_ids(pid)
}

#[cfg(not(windows))]
fn thread_ids(_pid: u32, process: &Process) -> Vec<u32> {
    let mut threads: Vec<u32> = process
        .tasks()
        .map(|tasks| tasks.iter().map(|tid| tid.as_u32()).collect())
        .unwrap_or_default();
    threads.sort_unstable();
    threads
}

impl ProcessTable for SystemProcessTable {
    fn find_by_name(&self, name: &str) -> Vec<LiveProcess> {
        let sys = Self::snapshot();
        let mut found: Vec<LiveProcess> = sys
            .processes()
            .iter()
            .filter(|(_, process)| is_live(process))
            .filter(|(_, process)| process_name_matches(&process.name().to_string_lossy(), name))
            .map(|(pid, process)| to_live_process(*pid, process))
            .collect();
        found.sort_by_key(|p| p.pid);
        found
    }

    fn find_by_pid(&self, pid: u32) -> Option<LiveProcess> {
        let sys = Self::snapshot();
        let sys_pid = Pid::from_u32(pid);
        sys.process(sys_pid)
            .filter(|process| is_live(process))
            .map(|process| to_live_process(sys_pid, process))
    }

    fn kill(&self, pid: u32) -> Result<(), KillError> {
        let sys = Self::snapshot();
        let process = sys
            .process(Pid::from_u32(pid))
            .filter(|process| is_live(process))
            .ok_or(KillError::NotFound(pid))?;
        debug!(pid, "Killing process");
        if process.kill() {
            Ok(())
        } else {
            Err(KillError::Refused(pid))
        }
    }

    fn kill_tree(&self, pid: u32) -> Result<(), KillError> {
        let sys = Self::snapshot();
        let root = sys
            .process(Pid::from_u32(pid))
            .filter(|process| is_live(process))
            .ok_or(KillError::NotFound(pid))?;

        let descendants = find_all_descendants(&sys, pid);
        debug!(
            pid,
            "Killing process tree ({} descendants: {:?})",
            descendants.len(),
            descendants
        );

        // Leaves first, so no child is re-parented while we walk the tree
        let mut survivors = Vec::new();
        for &child in descendants.iter().rev() {
            if let Some(process) = sys.process(Pid::from_u32(child)) {
                if is_live(process) && !process.kill() {
                    survivors.push(child);
                }
            }
        }

        if !root.kill() {
            return Err(KillError::Tree {
                pid,
                reason: "root process refused termination".to_string(),
            });
        }

        if !survivors.is_empty() {
            warn!(pid, "Descendants survived tree kill: {:?}", survivors);
            return Err(KillError::Tree {
                pid,
                reason: format!("{} descendant(s) refused termination", survivors.len()),
            });
        }
        Ok(())
    }
}
