//! `status`: report which programs are running

use crate::{
    cli::config::Config, coordinator::RunCoordinator, platform::SystemPlatform,
    target::ProgramTarget,
};
use std::io::{self, Write};

pub fn handle_status(config: &Config, targets: &[ProgramTarget]) -> eyre::Result<()> {
    let platform = SystemPlatform::new(&config.packages);
    let statuses = RunCoordinator::new(&platform, &config.timeouts).status(targets);

    let mut out = io::stdout().lock();
    for status in &statuses {
        writeln!(out, "{status}")?;
    }
    Ok(())
}
