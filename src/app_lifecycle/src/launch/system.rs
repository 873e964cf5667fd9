//! Process launch primitives of the host

use super::Launcher;
use std::{
    io,
    path::Path,
    process::{Command, Stdio},
};
use tracing::debug;

/// Niceness applied to launched executables on POSIX hosts
#[cfg(unix)]
const BELOW_NORMAL_NICENESS: libc::c_int = 10;

/// Starts programs as detached children of this process
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch_executable(&self, path: &Path) -> io::Result<u32> {
        let mut command = Command::new(path);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach_with_low_priority(&mut command);

        if let Some(dir) = path.parent().filter(|dir| dir.is_dir()) {
            command.current_dir(dir);
        }

        // The child outlives this run; it is never waited on
        let child = command.spawn()?;
        debug!(path = %path.display(), pid = child.id(), "Spawned executable");
        Ok(child.id())
    }

    #[cfg(windows)]
    fn launch_package(&self, aumid: &str) -> io::Result<()> {
        let child = Command::new("explorer.exe")
            .arg(format!("shell:AppsFolder\\{aumid}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        debug!(%aumid, pid = child.id(), "Requested packaged app launch through the shell");
        Ok(())
    }

    #[cfg(not(windows))]
    fn launch_package(&self, _aumid: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "packaged applications can only be launched on Windows",
        ))
    }
}

#[cfg(windows)]
fn detach_with_low_priority(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    use windows::Win32::System::Threading::{BELOW_NORMAL_PRIORITY_CLASS, CREATE_NEW_PROCESS_GROUP};

    command.creation_flags(BELOW_NORMAL_PRIORITY_CLASS.0 | CREATE_NEW_PROCESS_GROUP.0);
}

#[cfg(unix)]
fn detach_with_low_priority(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    // Safety: setsid() and nice() are async-signal-safe and only affect the child.
    unsafe {
        command.pre_exec(|| {
            libc::setsid();
            libc::nice(BELOW_NORMAL_NICENESS);
            Ok(())
        });
    }
}

#[cfg(not(any(windows, unix)))]
fn detach_with_low_priority(_command: &mut Command) {}
