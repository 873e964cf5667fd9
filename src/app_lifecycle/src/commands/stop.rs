//! `stop`: shut down every selected program

use super::common::build_tokio_runtime;
use crate::{
    cli::config::Config,
    coordinator::{RunCoordinator, RunSummary},
    platform::SystemPlatform,
    process::LaunchLedger,
    target::ProgramTarget,
};

/// A separate invocation never owns the processes it stops, so the ledger is
/// empty and only single processes are killed.
pub fn handle_stop(config: &Config, targets: &[ProgramTarget]) -> eyre::Result<RunSummary> {
    let runtime = build_tokio_runtime()?;
    let platform = SystemPlatform::new(&config.packages);

    let reports = runtime.block_on(
        RunCoordinator::new(&platform, &config.timeouts).stop_all(targets, &LaunchLedger::new()),
    );
    Ok(RunSummary::from_reports(&reports))
}
