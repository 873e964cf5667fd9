//! Package-level termination through an external command

use std::process::Stdio;
use tokio::{process::Command, time::Duration};
use tracing::debug;

/// Placeholder replaced by the package family in the command template
pub const FAMILY_PLACEHOLDER: &str = "{family}";

/// PowerShell pipeline stopping every process whose image lives in the
/// package's install location. Exits 2 when no such package is installed.
pub const DEFAULT_TERMINATE_SCRIPT: &str = "$ErrorActionPreference = 'Stop'; \
$pkg = Get-AppxPackage | Where-Object { $_.PackageFamilyName -eq '{family}' } | Select-Object -First 1; \
if (-not $pkg) { exit 2 }; \
Get-Process | Where-Object { $_.Path -and $_.Path.StartsWith($pkg.InstallLocation, [System.StringComparison]::OrdinalIgnoreCase) } | Stop-Process -Force; \
exit 0";

/// Default command template for package termination
pub fn default_terminate_command() -> Vec<String> {
    ["powershell", "-NoProfile", "-NonInteractive", "-Command", DEFAULT_TERMINATE_SCRIPT]
        .into_iter()
        .map(String::from)
        .collect()
}

/// How a termination request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationStatus {
    /// The command ran to completion
    Exited { code: i32, stderr: String },
    /// The command was ended by a signal
    Signalled,
    /// The command did not finish in time and was killed
    TimedOut,
    /// The command could not be run at all
    NotStarted(String),
}

/// Requests termination of every process of a package family
pub trait PackageTerminator {
    async fn terminate(&self, family: &str, timeout: Duration) -> TerminationStatus;
}

/// Runs a configurable command as an isolated child process.
///
/// The wait is bounded here, not by the child: on timeout the child is killed.
#[derive(Debug, Clone)]
pub struct CommandTerminator {
    command: Vec<String>,
}

impl CommandTerminator {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn render(&self, family: &str) -> Option<(String, Vec<String>)> {
        let (program, args) = self.command.split_first()?;
        let render = |part: &String| part.replace(FAMILY_PLACEHOLDER, family);
        Some((render(program), args.iter().map(render).collect()))
    }
}

impl Default for CommandTerminator {
    fn default() -> Self {
        Self::new(default_terminate_command())
    }
}

/// Package families only contain letters, digits, `.`, `-` and `_`; anything
/// else would be spliced verbatim into a shell command.
fn is_valid_family(family: &str) -> bool {
    !family.is_empty()
        && family
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

impl PackageTerminator for CommandTerminator {
    async fn terminate(&self, family: &str, timeout: Duration) -> TerminationStatus {
        if !is_valid_family(family) {
            return TerminationStatus::NotStarted(format!(
                "refusing to terminate malformed package family '{family}'"
            ));
        }
        let Some((program, args)) = self.render(family) else {
            return TerminationStatus::NotStarted("termination command is empty".to_string());
        };

        debug!(%family, "Running package termination command: {} {:?}", program, args);
        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return TerminationStatus::NotStarted(format!("failed to spawn {program}: {e}"))
            }
        };

        // Dropping the pending wait on timeout kills the child (kill_on_drop)
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_) => TerminationStatus::TimedOut,
            Ok(Err(e)) => {
                TerminationStatus::NotStarted(format!("failed to wait for {program}: {e}"))
            }
            Ok(Ok(output)) => match output.status.code() {
                Some(code) => TerminationStatus::Exited {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                },
                None => TerminationStatus::Signalled,
            },
        }
    }
}
