//! `start`: launch every selected program

use super::common::build_tokio_runtime;
use crate::{
    cli::config::Config,
    coordinator::{RunCoordinator, RunSummary},
    platform::SystemPlatform,
    process::LaunchLedger,
    target::ProgramTarget,
};

pub fn handle_start(config: &Config, targets: &[ProgramTarget]) -> eyre::Result<RunSummary> {
    let runtime = build_tokio_runtime()?;
    let platform = SystemPlatform::new(&config.packages);
    let mut ledger = LaunchLedger::new();

    let outcomes = runtime.block_on(
        RunCoordinator::new(&platform, &config.timeouts).start_all(targets, &mut ledger),
    );
    Ok(RunSummary::from_launches(&outcomes))
}
