//! Per-run log directories

use super::timestamp::run_dir_name;
use eyre::Context;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Name of the link pointing at the newest run directory
pub const LATEST_LINK: &str = "latest";

const MAX_SUFFIX: usize = 1000;

/// Create a fresh run directory under `base`.
///
/// The directory is named after the current local time. Runs started within
/// the same second get a `-1`, `-2`, ... suffix. On POSIX hosts `base/latest`
/// is re-pointed at the new directory.
pub fn create_run_dir(base: &Path) -> eyre::Result<PathBuf> {
    fs::create_dir_all(base)
        .wrap_err_with(|| format!("unable to create log directory {}", base.display()))?;

    let run_dir = claim_run_dir(base, &run_dir_name(chrono::Local::now()))?;

    #[cfg(unix)]
    link_latest(base, &run_dir)?;

    Ok(run_dir)
}

/// Atomically create the first free `stamp[-N]` directory
fn claim_run_dir(base: &Path, stamp: &str) -> eyre::Result<PathBuf> {
    let candidates = std::iter::once(stamp.to_string())
        .chain((1..=MAX_SUFFIX).map(|n| format!("{stamp}-{n}")));

    for name in candidates {
        let dir = base.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("unable to create {}", dir.display()))
            }
        }
    }
    eyre::bail!("no free run directory for {stamp} after {MAX_SUFFIX} attempts")
}

#[cfg(unix)]
fn link_latest(base: &Path, run_dir: &Path) -> eyre::Result<()> {
    let link = base.join(LATEST_LINK);
    if link.symlink_metadata().is_ok() {
        fs::remove_file(&link)
            .wrap_err_with(|| format!("unable to replace {}", link.display()))?;
    }
    if let Some(name) = run_dir.file_name() {
        std::os::unix::fs::symlink(name, &link)
            .wrap_err_with(|| format!("unable to link {} to {}", link.display(), run_dir.display()))?;
    }
    Ok(())
}
