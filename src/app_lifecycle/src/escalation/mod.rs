//! Shutdown escalation
//!
//! Each target walks a fixed, linear plan of termination strategies:
//!
//! - native executables: graceful close → force kill
//! - packaged apps: graceful close → package terminate → force kill
//!
//! Every strategy runs at most once, every wait is bounded, and the first
//! strategy that ends the program stops the sequence. A target that is not
//! running at all ends as [`Verdict::NotRunning`] without a single attempt.
//! Expected failures are outcomes. A panic inside a step never leaves
//! [`EscalationEngine::stop`]; it is logged and turned into a
//! [`Verdict::Failed`] report so that the caller can move on to the next
//! target.

pub mod attempt;

pub use attempt::{EscalationAttempt, Outcome, ShutdownReport, Strategy, Verdict};

use crate::{
    cli::config::Timeouts,
    package::{package_family, PackageIntrospection, PackageTerminator, TerminationStatus},
    platform::Platform,
    process::{wait_for_exit, KillError, LaunchLedger, ProcessTable},
    target::{ProcessKind, ProgramTarget},
    window::WindowMessenger,
};
use futures::FutureExt;
use std::{any::Any, panic::AssertUnwindSafe};
use tracing::{error, info, warn};

const NATIVE_PLAN: &[Strategy] = &[Strategy::GracefulClose, Strategy::ForceKill];
const PACKAGED_PLAN: &[Strategy] = &[
    Strategy::GracefulClose,
    Strategy::PackageTerminate,
    Strategy::ForceKill,
];

/// Strategies tried for a process kind, in order
pub fn plan(kind: ProcessKind) -> &'static [Strategy] {
    match kind {
        ProcessKind::NativeExecutable => NATIVE_PLAN,
        ProcessKind::PackagedApp => PACKAGED_PLAN,
    }
}

/// Drives the shutdown sequence of one target at a time
pub struct EscalationEngine<'a, P: ?Sized> {
    platform: &'a P,
    ledger: &'a LaunchLedger,
    timeouts: &'a Timeouts,
}

impl<'a, P: Platform + ?Sized> EscalationEngine<'a, P> {
    pub fn new(platform: &'a P, ledger: &'a LaunchLedger, timeouts: &'a Timeouts) -> Self {
        Self {
            platform,
            ledger,
            timeouts,
        }
    }

    /// Stop `target`, escalating until it is gone or every strategy failed.
    pub async fn stop(&self, target: &ProgramTarget) -> ShutdownReport {
        let mut attempts = Vec::new();
        let result = AssertUnwindSafe(self.escalate(target, &mut attempts))
            .catch_unwind()
            .await;

        let (verdict, error) = match result {
            Ok(verdict) => (verdict, None),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(program = %target.name, "Shutdown aborted by panic: {}", message);
                (Verdict::Failed, Some(format!("panic: {message}")))
            }
        };

        ShutdownReport {
            program: target.name.clone(),
            attempts,
            verdict,
            error,
        }
    }

    async fn escalate(
        &self,
        target: &ProgramTarget,
        attempts: &mut Vec<EscalationAttempt>,
    ) -> Verdict {
        if !self.is_running(target) {
            warn!(
                program = %target.name,
                process = %target.process_name,
                "Not running, nothing to stop"
            );
            return Verdict::NotRunning;
        }

        for &strategy in plan(target.kind()) {
            let attempt = match strategy {
                Strategy::GracefulClose => self.try_graceful(target).await,
                Strategy::PackageTerminate => self.try_package_terminate(target).await,
                Strategy::ForceKill => self.try_force_kill(target).await,
            };
            log_attempt(target, &attempt);

            let succeeded = attempt.succeeded();
            attempts.push(attempt);
            if succeeded {
                info!(program = %target.name, "Terminated");
                return Verdict::Terminated;
            }
        }

        error!(
            program = %target.name,
            process = %target.process_name,
            "All shutdown strategies exhausted; program may still be running"
        );
        Verdict::Failed
    }

    /// A target runs when its process is alive or, for packaged apps, when a
    /// UI host presents it.
    fn is_running(&self, target: &ProgramTarget) -> bool {
        if !self.platform.table().find_by_name(&target.process_name).is_empty() {
            return true;
        }
        match target.aumid() {
            Some(aumid) => {
                let packages = self.platform.packages();
                packages.is_supported() && packages.find_host(aumid).is_some()
            }
            None => false,
        }
    }

    fn messenger(&self) -> WindowMessenger<'_, P::Windows, P::Table> {
        WindowMessenger::new(self.platform.windows(), self.platform.table())
    }

    async fn try_graceful(&self, target: &ProgramTarget) -> EscalationAttempt {
        let timeout = self.timeouts.graceful_close;

        let pid = match target.aumid() {
            None => match self.platform.table().find_by_name(&target.process_name).first() {
                Some(process) => process.pid,
                None => {
                    return EscalationAttempt::new(
                        Strategy::GracefulClose,
                        Outcome::Success,
                        "process exited before the close request",
                    )
                }
            },
            Some(aumid) => {
                let packages = self.platform.packages();
                if !packages.is_supported() {
                    warn!(
                        program = %target.name,
                        "Packaged app introspection is not available on this platform"
                    );
                    return EscalationAttempt::new(
                        Strategy::GracefulClose,
                        Outcome::NotApplicable,
                        "packaged app introspection unsupported on this platform",
                    );
                }
                match packages.find_host(aumid) {
                    Some(pid) => pid,
                    None => {
                        return EscalationAttempt::new(
                            Strategy::GracefulClose,
                            Outcome::NotApplicable,
                            format!("no running host presents {aumid}"),
                        )
                    }
                }
            }
        };

        info!(program = %target.name, pid, "Requesting cooperative close");
        if self.messenger().close(pid, timeout).await {
            EscalationAttempt::new(
                Strategy::GracefulClose,
                Outcome::Success,
                format!("pid {pid} closed"),
            )
        } else {
            EscalationAttempt::new(
                Strategy::GracefulClose,
                Outcome::TimedOut,
                format!("pid {pid} still running {}ms after close request", timeout.as_millis()),
            )
        }
    }

    async fn try_package_terminate(
        &self,
        target: &ProgramTarget,
    ) -> EscalationAttempt {
        let Some(family) = target.aumid().and_then(package_family) else {
            return EscalationAttempt::new(
                Strategy::PackageTerminate,
                Outcome::NotApplicable,
                "no package family can be derived",
            );
        };

        let timeout = self.timeouts.package_terminate;
        info!(program = %target.name, %family, "Requesting package termination");
        let status = self.platform.terminator().terminate(family, timeout).await;

        match status {
            TerminationStatus::Exited { code: 0, .. } => EscalationAttempt::new(
                Strategy::PackageTerminate,
                Outcome::Success,
                format!("package {family} terminated"),
            ),
            TerminationStatus::Exited { code, stderr } if stderr.is_empty() => {
                EscalationAttempt::new(
                    Strategy::PackageTerminate,
                    Outcome::Failed,
                    format!("termination command exited with code {code}"),
                )
            }
            TerminationStatus::Exited { code, stderr } => EscalationAttempt::new(
                Strategy::PackageTerminate,
                Outcome::Failed,
                format!("termination command exited with code {code}: {stderr}"),
            ),
            TerminationStatus::Signalled => EscalationAttempt::new(
                Strategy::PackageTerminate,
                Outcome::Failed,
                "termination command was killed by a signal",
            ),
            TerminationStatus::TimedOut => EscalationAttempt::new(
                Strategy::PackageTerminate,
                Outcome::TimedOut,
                format!("termination command did not finish within {}ms", timeout.as_millis()),
            ),
            TerminationStatus::NotStarted(reason) => {
                EscalationAttempt::new(Strategy::PackageTerminate, Outcome::Failed, reason)
            }
        }
    }

    async fn try_force_kill(&self, target: &ProgramTarget) -> EscalationAttempt {
        let processes = self.platform.table().find_by_name(&target.process_name);
        if processes.is_empty() {
            // A shared UI host may still present the app; it is never killed.
            return if self.is_running(target) {
                EscalationAttempt::new(
                    Strategy::ForceKill,
                    Outcome::Failed,
                    format!(
                        "no process named {} to kill but a host still presents the app",
                        target.process_name
                    ),
                )
            } else {
                EscalationAttempt::new(
                    Strategy::ForceKill,
                    Outcome::Success,
                    "no live process remained",
                )
            };
        }

        let mut failures = Vec::new();
        for process in processes {
            let pid = process.pid;

            // Last chance to exit cleanly before the kill
            if self.messenger().close(pid, self.timeouts.graceful_close).await {
                return EscalationAttempt::new(
                    Strategy::ForceKill,
                    Outcome::Success,
                    format!("pid {pid} exited after a final close request"),
                );
            }

            match self.kill(pid) {
                Ok(()) | Err(KillError::NotFound(_)) => {}
                Err(e) => {
                    warn!(program = %target.name, pid, "Kill failed: {}", e);
                    failures.push(format!("pid {pid}: {e}"));
                    continue;
                }
            }

            if wait_for_exit(self.platform.table(), pid, self.timeouts.kill_confirm).await {
                return EscalationAttempt::new(
                    Strategy::ForceKill,
                    Outcome::Success,
                    format!("pid {pid} killed"),
                );
            }
            failures.push(format!("pid {pid} survived the kill"));
        }

        EscalationAttempt::new(
            Strategy::ForceKill,
            Outcome::Failed,
            failures.join("; "),
        )
    }

    /// Kill a process, taking its tree with it only when this run started it.
    fn kill(&self, pid: u32) -> Result<(), KillError> {
        let table = self.platform.table();
        if self.ledger.owns(pid) {
            match table.kill_tree(pid) {
                Ok(()) => {
                    info!(pid, "Killed process tree");
                    return Ok(());
                }
                Err(e) => {
                    warn!(pid, "Tree kill rejected ({}); killing the single process", e);
                }
            }
        }
        table.kill(pid)?;
        info!(pid, "Killed process");
        Ok(())
    }
}

fn log_attempt(target: &ProgramTarget, attempt: &EscalationAttempt) {
    let reason = attempt.reason.as_deref().unwrap_or("");
    match attempt.outcome {
        Outcome::Success | Outcome::NotApplicable => info!(
            program = %target.name,
            strategy = %attempt.strategy,
            outcome = %attempt.outcome,
            reason,
            "Escalation step finished"
        ),
        Outcome::TimedOut | Outcome::Failed => warn!(
            program = %target.name,
            strategy = %attempt.strategy,
            outcome = %attempt.outcome,
            reason,
            "Escalation step finished"
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
