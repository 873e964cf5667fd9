//! `session`: start every selected program, keep them up until this process
//! is told to terminate, then stop them again.
//!
//! Unlike a separate `stop` invocation, the stop half of a session owns the
//! executables it spawned and takes their whole process trees down.

use super::{common::build_tokio_runtime, signal::wait_for_termination};
use crate::{
    cli::config::Config,
    coordinator::{RunCoordinator, RunSummary},
    platform::SystemPlatform,
    process::LaunchLedger,
    target::ProgramTarget,
};
use tracing::info;

pub fn handle_session(
    config: &Config,
    targets: &[ProgramTarget],
) -> eyre::Result<(RunSummary, RunSummary)> {
    let runtime = build_tokio_runtime()?;
    let platform = SystemPlatform::new(&config.packages);
    let coordinator = RunCoordinator::new(&platform, &config.timeouts);

    runtime.block_on(async {
        let mut ledger = LaunchLedger::new();
        let launches = coordinator.start_all(targets, &mut ledger).await;

        info!(owned = ledger.len(), "Session running; send SIGINT or SIGTERM to stop");
        wait_for_termination().await?;

        let reports = coordinator.stop_all(targets, &ledger).await;
        Ok((
            RunSummary::from_launches(&launches),
            RunSummary::from_reports(&reports),
        ))
    })
}
