//! Tracing subscriber setup
//!
//! Two layers are installed: a console layer on stderr whose level follows
//! `--quiet` (or `RUST_LOG` when set), and a plain-text file layer that always
//! records debug output into the run directory.

use eyre::Context;
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// File name of the run log inside the run directory
pub const LOG_FILE_NAME: &str = "app_lifecycle.log";

/// Console filter directive used when `RUST_LOG` is not set
pub fn default_console_directive(quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Install the global subscriber, logging into `run_dir`.
///
/// Returns the path of the run log.
pub fn init_tracing(run_dir: &Path, quiet: bool) -> eyre::Result<PathBuf> {
    let log_path = run_dir.join(LOG_FILE_NAME);
    let file = File::create(&log_path)
        .wrap_err_with(|| format!("unable to create log file {}", log_path.display()))?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_console_directive(quiet)));
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let run_log = fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console)
        .with(run_log)
        .try_init()
        .wrap_err("unable to install the tracing subscriber")?;

    Ok(log_path)
}
