//! Escalation audit trail types

use std::fmt;

/// A termination strategy, in escalation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Ask the program to close its windows
    GracefulClose,
    /// Terminate every process of the program's package
    PackageTerminate,
    /// Kill the remaining processes outright
    ForceKill,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::GracefulClose => "graceful-close",
            Strategy::PackageTerminate => "package-terminate",
            Strategy::ForceKill => "force-kill",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single strategy ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TimedOut,
    NotApplicable,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::TimedOut => "timed-out",
            Outcome::NotApplicable => "not-applicable",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a shutdown sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationAttempt {
    pub strategy: Strategy,
    pub outcome: Outcome,
    pub reason: Option<String>,
}

impl EscalationAttempt {
    pub fn new(strategy: Strategy, outcome: Outcome, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            outcome,
            reason: Some(reason.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Terminal state of a shutdown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A strategy ended the program
    Terminated,
    /// Nothing matching the program was running
    NotRunning,
    /// Every strategy failed, or the sequence was aborted
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Terminated => "terminated",
            Verdict::NotRunning => "not-running",
            Verdict::Failed => "failed",
        })
    }
}

/// Audit trail of one stop request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub program: String,
    pub attempts: Vec<EscalationAttempt>,
    pub verdict: Verdict,
    /// Unexpected error that aborted the sequence
    pub error: Option<String>,
}

impl ShutdownReport {
    pub fn strategies(&self) -> Vec<Strategy> {
        self.attempts.iter().map(|a| a.strategy).collect()
    }

    pub fn outcomes(&self) -> Vec<(Strategy, Outcome)> {
        self.attempts.iter().map(|a| (a.strategy, a.outcome)).collect()
    }
}
