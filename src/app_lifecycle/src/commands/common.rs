//! Shared utilities for command handlers

use tracing::debug;

/// Targets are handled one at a time, so a couple of workers are plenty;
/// the extra thread keeps timers running while a blocking OS call is in
/// flight.
const WORKER_THREADS: usize = 2;

/// Build the Tokio runtime driving one invocation.
pub(crate) fn build_tokio_runtime() -> eyre::Result<tokio::runtime::Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .thread_name("app_lifecycle-worker")
        .enable_all()
        .build()?;
    debug!("Tokio runtime created ({} worker threads)", WORKER_THREADS);
    Ok(runtime)
}
