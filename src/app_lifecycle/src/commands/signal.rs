//! Termination signal handling

use eyre::Context;
use tracing::info;

/// Wait for SIGINT or SIGTERM.
#[cfg(unix)]
pub(crate) async fn wait_for_termination() -> eyre::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint =
        signal(SignalKind::interrupt()).wrap_err("unable to register SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).wrap_err("unable to register SIGTERM handler")?;

    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }
    Ok(())
}

/// Wait for Ctrl-C.
#[cfg(not(unix))]
pub(crate) async fn wait_for_termination() -> eyre::Result<()> {
    tokio::signal::ctrl_c()
        .await
        .wrap_err("unable to listen for Ctrl-C")?;
    info!("Received Ctrl-C");
    Ok(())
}
