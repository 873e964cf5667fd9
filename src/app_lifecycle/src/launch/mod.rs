//! Program launch and launch verification

pub mod system;

pub use system::SystemLauncher;

use crate::{
    process::{LaunchLedger, ProcessTable},
    target::{Locator, ProgramTarget},
};
use std::{io, path::Path};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Process start primitives
pub trait Launcher {
    /// Start an executable directly, returning the pid of the new process
    fn launch_executable(&self, path: &Path) -> io::Result<u32>;

    /// Ask the shell to start a packaged application by its AUMID
    fn launch_package(&self, aumid: &str) -> io::Result<()>;
}

/// Result of starting one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Matching processes were found after the settle time
    Started { pids: Vec<u32> },
    /// The launch request failed, or nothing showed up in time
    Failed { reason: String },
}

impl LaunchOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, LaunchOutcome::Started { .. })
    }
}

/// Starts targets and verifies that they came up
pub struct LaunchOrchestrator<'a, L: ?Sized, T: ?Sized> {
    launcher: &'a L,
    table: &'a T,
    settle: Duration,
}

impl<'a, L, T> LaunchOrchestrator<'a, L, T>
where
    L: Launcher + ?Sized,
    T: ProcessTable + ?Sized,
{
    pub fn new(launcher: &'a L, table: &'a T, settle: Duration) -> Self {
        Self {
            launcher,
            table,
            settle,
        }
    }

    /// Start `target`, wait for the settle time and check that a process
    /// named `target.process_name` is alive.
    ///
    /// Directly spawned executables are recorded in `ledger`; they own their
    /// process tree for the rest of the run. Failures are logged and returned,
    /// never raised.
    pub async fn launch(&self, target: &ProgramTarget, ledger: &mut LaunchLedger) -> LaunchOutcome {
        info!(program = %target.name, kind = %target.kind(), "Starting");

        let requested = match &target.locator {
            Locator::Executable(path) => self.launcher.launch_executable(path).map(|pid| {
                ledger.record(pid);
                Some(pid)
            }),
            Locator::Package(aumid) => self.launcher.launch_package(aumid).map(|()| None),
        };

        let spawned_pid = match requested {
            Ok(pid) => pid,
            Err(e) => {
                let reason = if e.kind() == io::ErrorKind::Unsupported {
                    warn!(program = %target.name, "Platform cannot launch this program: {}", e);
                    format!("unsupported on this platform: {e}")
                } else {
                    warn!(program = %target.name, "Launch request failed: {}", e);
                    format!("launch request failed: {e}")
                };
                return LaunchOutcome::Failed { reason };
            }
        };

        sleep(self.settle).await;

        let pids: Vec<u32> = self
            .table
            .find_by_name(&target.process_name)
            .into_iter()
            .map(|process| process.pid)
            .collect();

        if pids.is_empty() {
            let reason = format!(
                "no process named '{}' appeared within {:?}",
                target.process_name, self.settle
            );
            warn!(program = %target.name, spawned_pid = ?spawned_pid, "Launch not verified: {}", reason);
            return LaunchOutcome::Failed { reason };
        }

        info!(program = %target.name, pids = ?pids, "Started");
        LaunchOutcome::Started { pids }
    }
}
