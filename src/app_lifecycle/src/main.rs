use app_lifecycle::{
    cli::{
        config::Config,
        options::{Command, Options},
    },
    commands::{handle_session, handle_start, handle_status, handle_stop},
    util::{log_dir::create_run_dir, logging::init_tracing},
};
use clap::Parser;
use eyre::Context;
use tracing::{debug, info};

fn main() -> eyre::Result<()> {
    let opts = Options::parse();

    // Configuration and logging defects are fatal before any program is touched
    let config = Config::load(&opts.common.config)?;
    let targets = config
        .select(&opts.common.programs)
        .wrap_err("invalid --program selection")?;

    let log_base = opts
        .common
        .log_dir
        .clone()
        .unwrap_or_else(|| config.log_dir.clone());
    let run_dir = create_run_dir(&log_base)?;
    let log_path = init_tracing(&run_dir, opts.common.quiet)?;
    debug!(
        config = %opts.common.config.display(),
        log = %log_path.display(),
        "Logging initialised"
    );

    match opts.command {
        Command::Start => {
            let summary = handle_start(&config, &targets)?;
            debug!(
                started = summary.succeeded,
                failed = summary.failed,
                "Start summary"
            );
        }
        Command::Stop => {
            let summary = handle_stop(&config, &targets)?;
            debug!(
                terminated = summary.succeeded,
                not_running = summary.not_running,
                failed = summary.failed,
                "Stop summary"
            );
        }
        Command::Status => {
            handle_status(&config, &targets)?;
        }
        Command::Session => {
            let (started, stopped) = handle_session(&config, &targets)?;
            debug!(
                started = started.succeeded,
                start_failed = started.failed,
                terminated = stopped.succeeded,
                not_running = stopped.not_running,
                stop_failed = stopped.failed,
                "Session summary"
            );
        }
    }

    info!(log = %log_path.display(), "Done");
    Ok(())
}
