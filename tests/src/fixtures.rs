use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU32, Ordering},
    time::{Duration, Instant},
};
use tempfile::TempDir;

/// Per-process counter combined with the pid so that concurrently running
/// test binaries never share a stand-in name.
static CALL_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A process name no other process on the host uses.
///
/// Kept under 15 characters, the length at which Linux truncates process
/// names.
pub fn unique_name(tag: &str) -> String {
    let seq = CALL_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("alc{}{:x}{}", tag, std::process::id(), seq)
}

/// A uniquely named shell script standing in for a desktop program.
///
/// The script starts a `sleep` child, records the child's pid next to itself
/// and waits for it. Its process name is the script's file name.
pub struct StandIn {
    _dir: TempDir,
    path: PathBuf,
    name: String,
}

impl StandIn {
    /// Exits on SIGTERM, like a program that honours a close request
    pub fn cooperative() -> Self {
        Self::write("c", "")
    }

    /// Ignores SIGTERM, like a program that never answers a close request
    pub fn stubborn() -> Self {
        Self::write("s", "trap '' TERM\n")
    }

    fn write(tag: &str, preamble: &str) -> Self {
        let dir = tempfile::tempdir()
            .expect("failed to create stand-in directory");
        let name = unique_name(tag);
        let path = dir.path().join(&name);
        let script = format!(
            "#!/bin/sh\n{preamble}sleep 300 &\necho $! > \"$0.child\"\nwait\n"
        );
        fs::write(&path, script).expect("failed to write stand-in script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("failed to mark stand-in executable");
        Self {
            _dir: dir,
            path,
            name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pid of the `sleep` child, once the script has recorded it
    pub fn child_pid(&self, timeout: Duration) -> Option<u32> {
        let file = PathBuf::from(format!("{}.child", self.path.display()));
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(pid) = fs::read_to_string(&file)
                .ok()
                .and_then(|text| text.trim().parse().ok())
            {
                return Some(pid);
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}

/// Whether `pid` is alive. Zombies count as exited.
pub fn is_running(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next())
            .is_some_and(|state| !matches!(state, 'Z' | 'X')),
        Err(_) if Path::new("/proc/self/stat").exists() => false,
        // No procfs: fall back to a null signal, which cannot tell zombies apart
        Err(_) => unsafe { libc::kill(pid as libc::pid_t, 0) == 0 },
    }
}

/// Poll until `pid` has exited
pub fn wait_until_exited(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while is_running(pid) {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    true
}
