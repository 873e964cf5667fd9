//! Sequential processing of the configured targets

use crate::{
    cli::config::Timeouts,
    escalation::{EscalationEngine, ShutdownReport, Verdict},
    launch::{LaunchOrchestrator, LaunchOutcome},
    package::PackageIntrospection,
    platform::Platform,
    process::{LaunchLedger, ProcessTable},
    target::{ProcessKind, ProgramTarget},
};
use std::fmt;
use tokio::time::sleep;
use tracing::{info, warn};

/// Per-run counts of target results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Started (for `start`) or terminated (for `stop`)
    pub succeeded: usize,
    pub not_running: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_launches(outcomes: &[LaunchOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_started()).count();
        Self {
            succeeded,
            not_running: 0,
            failed: outcomes.len() - succeeded,
        }
    }

    pub fn from_reports(reports: &[ShutdownReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.verdict {
                Verdict::Terminated => summary.succeeded += 1,
                Verdict::NotRunning => summary.not_running += 1,
                Verdict::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.not_running + self.failed
    }
}

/// What `status` reports for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    pub program: String,
    pub kind: ProcessKind,
    /// Live processes matching the expected process name
    pub pids: Vec<u32>,
    /// UI host presenting a packaged app, when it can be resolved
    pub host: Option<u32>,
}

impl TargetStatus {
    pub fn is_running(&self) -> bool {
        !self.pids.is_empty() || self.host.is_some()
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): ", self.program, self.kind)?;
        if !self.is_running() {
            return f.write_str("not running");
        }
        let pids: Vec<String> = self.pids.iter().map(u32::to_string).collect();
        write!(f, "running, pids [{}]", pids.join(", "))?;
        if let Some(host) = self.host {
            write!(f, ", host {host}")?;
        }
        Ok(())
    }
}

/// Drives start, stop and status over targets, strictly one at a time
pub struct RunCoordinator<'a, P: ?Sized> {
    platform: &'a P,
    timeouts: &'a Timeouts,
}

impl<'a, P: Platform + ?Sized> RunCoordinator<'a, P> {
    pub fn new(platform: &'a P, timeouts: &'a Timeouts) -> Self {
        Self { platform, timeouts }
    }

    /// Launch every target, pausing between consecutive targets.
    ///
    /// Directly spawned pids are recorded in `ledger`.
    pub async fn start_all(
        &self,
        targets: &[ProgramTarget],
        ledger: &mut LaunchLedger,
    ) -> Vec<LaunchOutcome> {
        let orchestrator = LaunchOrchestrator::new(
            self.platform.launcher(),
            self.platform.table(),
            self.timeouts.launch_settle,
        );

        let mut outcomes = Vec::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            if i > 0 {
                sleep(self.timeouts.inter_target_pause).await;
            }
            outcomes.push(orchestrator.launch(target, ledger).await);
        }

        let summary = RunSummary::from_launches(&outcomes);
        info!(
            started = summary.succeeded,
            failed = summary.failed,
            "Start finished for {} program(s)",
            summary.total()
        );
        outcomes
    }

    /// Stop every target. A failing target never prevents the next one.
    pub async fn stop_all(
        &self,
        targets: &[ProgramTarget],
        ledger: &LaunchLedger,
    ) -> Vec<ShutdownReport> {
        let engine = EscalationEngine::new(self.platform, ledger, self.timeouts);

        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            info!(program = %target.name, kind = %target.kind(), "Stopping");
            let report = engine.stop(target).await;
            if report.verdict == Verdict::Failed {
                warn!(program = %report.program, "Could not stop program");
            }
            reports.push(report);
        }

        let summary = RunSummary::from_reports(&reports);
        info!(
            terminated = summary.succeeded,
            not_running = summary.not_running,
            failed = summary.failed,
            "Stop finished for {} program(s)",
            summary.total()
        );
        reports
    }

    /// Inspect every target without signalling anything
    pub fn status(&self, targets: &[ProgramTarget]) -> Vec<TargetStatus> {
        let packages = self.platform.packages();
        targets
            .iter()
            .map(|target| TargetStatus {
                program: target.name.clone(),
                kind: target.kind(),
                pids: self
                    .platform
                    .table()
                    .find_by_name(&target.process_name)
                    .into_iter()
                    .map(|process| process.pid)
                    .collect(),
                host: target
                    .aumid()
                    .filter(|_| packages.is_supported())
                    .and_then(|aumid| packages.find_host(aumid)),
            })
            .collect()
    }
}
