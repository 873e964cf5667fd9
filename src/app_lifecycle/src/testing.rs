//! Scripted stand-in for the operating system, used by unit tests.
//!
//! [`FakePlatform`] implements every platform trait over an in-memory process
//! table. Processes react to close requests and kills as scripted through
//! [`FakeProcess`], and every signal sent to them is recorded so that tests can
//! assert exactly what the code under test did.

use crate::{
    launch::Launcher,
    package::{PackageIntrospection, PackageTerminator, TerminationStatus},
    platform::Platform,
    process::{process_name_matches, KillError, LiveProcess, ProcessTable},
    window::{WindowHandle, WindowSystem},
};
use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use tokio::time::{Duration, Instant};

/// Behaviour script of one fake process
#[derive(Debug, Clone)]
pub struct FakeProcess {
    pid: u32,
    name: String,
    parent: Option<u32>,
    main_window: Option<WindowHandle>,
    thread_windows: Vec<(u32, WindowHandle)>,
    closes_after: Option<Duration>,
    ignored_windows: Vec<WindowHandle>,
    survives_kill: bool,
    package: Option<String>,
}

impl FakeProcess {
    pub fn new(pid: u32, name: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            parent: None,
            main_window: None,
            thread_windows: Vec::new(),
            closes_after: None,
            ignored_windows: Vec::new(),
            survives_kill: false,
            package: None,
        }
    }

    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_main_window(mut self, window: isize) -> Self {
        self.main_window = Some(WindowHandle(window));
        self
    }

    pub fn with_thread_window(mut self, thread_id: u32, window: isize) -> Self {
        self.thread_windows.push((thread_id, WindowHandle(window)));
        self
    }

    /// Exit `delay` after the first close request reaches one of its windows
    pub fn closes_after(mut self, delay: Duration) -> Self {
        self.closes_after = Some(delay);
        self
    }

    /// Accept close requests on `window` without reacting to them
    pub fn ignores_window(mut self, window: isize) -> Self {
        self.ignored_windows.push(WindowHandle(window));
        self
    }

    /// Accept kill requests without ever exiting
    pub fn survives_kill(mut self) -> Self {
        self.survives_kill = true;
        self
    }

    /// Exit when the package family is terminated successfully
    pub fn in_package(mut self, family: &str) -> Self {
        self.package = Some(family.to_string());
        self
    }

    fn owns_window(&self, window: WindowHandle) -> bool {
        self.main_window == Some(window) || self.thread_windows.iter().any(|&(_, w)| w == window)
    }

    fn snapshot(&self) -> LiveProcess {
        let mut threads: Vec<u32> = self.thread_windows.iter().map(|&(tid, _)| tid).collect();
        threads.sort_unstable();
        threads.dedup();
        LiveProcess {
            pid: self.pid,
            name: self.name.clone(),
            parent: self.parent,
            main_window: self.main_window,
            threads,
        }
    }
}

#[derive(Debug)]
struct Entry {
    process: FakeProcess,
    exit_at: Option<Instant>,
}

impl Entry {
    fn is_alive(&self) -> bool {
        self.exit_at.map_or(true, |at| Instant::now() < at)
    }

    fn exit_now(&mut self) {
        if self.is_alive() {
            self.exit_at = Some(Instant::now());
        }
    }
}

#[derive(Debug)]
struct State {
    processes: BTreeMap<u32, Entry>,
    package_support: bool,
    hosts: BTreeMap<String, u32>,
    termination: TerminationStatus,
    panic_on_terminate: bool,
    reject_tree_kill: bool,
    refuse_kill: Vec<u32>,
    launchable: BTreeMap<PathBuf, FakeProcess>,
    package_launchable: BTreeMap<String, FakeProcess>,
    closed_windows: Vec<WindowHandle>,
    kills: Vec<u32>,
    tree_kills: Vec<u32>,
    terminations: Vec<String>,
    launches: Vec<PathBuf>,
    package_launches: Vec<String>,
}

/// In-memory platform with scripted processes
#[derive(Debug)]
pub struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                processes: BTreeMap::new(),
                package_support: true,
                hosts: BTreeMap::new(),
                termination: TerminationStatus::Exited {
                    code: 0,
                    stderr: String::new(),
                },
                panic_on_terminate: false,
                reject_tree_kill: false,
                refuse_kill: Vec::new(),
                launchable: BTreeMap::new(),
                package_launchable: BTreeMap::new(),
                closed_windows: Vec::new(),
                kills: Vec::new(),
                tree_kills: Vec::new(),
                terminations: Vec::new(),
                launches: Vec::new(),
                package_launches: Vec::new(),
            }),
        }
    }

    // A panicking test thread may poison the lock; the state stays usable.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn without_package_support(self) -> Self {
        self.state().package_support = false;
        self
    }

    /// Register `host` as the UI host presenting `aumid`
    pub fn with_host(self, aumid: &str, host: FakeProcess) -> Self {
        {
            let mut state = self.state();
            state.hosts.insert(aumid.to_string(), host.pid);
            state.processes.insert(
                host.pid,
                Entry {
                    process: host,
                    exit_at: None,
                },
            );
        }
        self
    }

    pub fn with_termination(self, status: TerminationStatus) -> Self {
        self.state().termination = status;
        self
    }

    pub fn panicking_on_terminate(self) -> Self {
        self.state().panic_on_terminate = true;
        self
    }

    pub fn rejecting_tree_kill(self) -> Self {
        self.state().reject_tree_kill = true;
        self
    }

    pub fn refusing_kill(self, pid: u32) -> Self {
        self.state().refuse_kill.push(pid);
        self
    }

    pub fn add(&self, process: FakeProcess) {
        self.state().processes.insert(
            process.pid,
            Entry {
                process,
                exit_at: None,
            },
        );
    }

    /// Make `process` appear when `path` is launched
    pub fn on_launch(&self, path: impl Into<PathBuf>, process: FakeProcess) {
        self.state().launchable.insert(path.into(), process);
    }

    /// Make `process` appear when `aumid` is launched through the shell
    pub fn on_package_launch(&self, aumid: &str, process: FakeProcess) {
        self.state()
            .package_launchable
            .insert(aumid.to_string(), process);
    }

    pub fn is_running(&self, pid: u32) -> bool {
        self.state()
            .processes
            .get(&pid)
            .is_some_and(Entry::is_alive)
    }

    pub fn closed_windows(&self) -> Vec<WindowHandle> {
        self.state().closed_windows.clone()
    }

    pub fn kills(&self) -> Vec<u32> {
        self.state().kills.clone()
    }

    pub fn tree_kills(&self) -> Vec<u32> {
        self.state().tree_kills.clone()
    }

    pub fn terminations(&self) -> Vec<String> {
        self.state().terminations.clone()
    }

    pub fn launches(&self) -> Vec<PathBuf> {
        self.state().launches.clone()
    }

    pub fn package_launches(&self) -> Vec<String> {
        self.state().package_launches.clone()
    }

    /// Nothing was closed, killed or terminated
    pub fn untouched(&self) -> bool {
        let state = self.state();
        state.closed_windows.is_empty()
            && state.kills.is_empty()
            && state.tree_kills.is_empty()
            && state.terminations.is_empty()
    }
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for FakePlatform {
    fn find_by_name(&self, name: &str) -> Vec<LiveProcess> {
        self.state()
            .processes
            .values()
            .filter(|entry| entry.is_alive() && process_name_matches(&entry.process.name, name))
            .map(|entry| entry.process.snapshot())
            .collect()
    }

    fn find_by_pid(&self, pid: u32) -> Option<LiveProcess> {
        self.state()
            .processes
            .get(&pid)
            .filter(|entry| entry.is_alive())
            .map(|entry| entry.process.snapshot())
    }

    fn kill(&self, pid: u32) -> Result<(), KillError> {
        let mut state = self.state();
        state.kills.push(pid);
        if state.refuse_kill.contains(&pid) {
            return Err(KillError::Refused(pid));
        }
        match state.processes.get_mut(&pid) {
            Some(entry) if entry.is_alive() => {
                if !entry.process.survives_kill {
                    entry.exit_now();
                }
                Ok(())
            }
            _ => Err(KillError::NotFound(pid)),
        }
    }

    fn kill_tree(&self, pid: u32) -> Result<(), KillError> {
        let mut state = self.state();
        state.tree_kills.push(pid);
        if state.reject_tree_kill {
            return Err(KillError::Tree {
                pid,
                reason: "access denied".to_string(),
            });
        }

        let mut doomed = vec![pid];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i];
            let children: Vec<u32> = state
                .processes
                .values()
                .filter(|entry| entry.process.parent == Some(parent))
                .map(|entry| entry.process.pid)
                .filter(|child| !doomed.contains(child))
                .collect();
            doomed.extend(children);
            i += 1;
        }

        for pid in doomed {
            if let Some(entry) = state.processes.get_mut(&pid) {
                if !entry.process.survives_kill {
                    entry.exit_now();
                }
            }
        }
        Ok(())
    }
}

impl WindowSystem for FakePlatform {
    fn thread_windows(&self, thread_id: u32) -> Vec<WindowHandle> {
        self.state()
            .processes
            .values()
            .filter(|entry| entry.is_alive())
            .flat_map(|entry| entry.process.thread_windows.iter())
            .filter(|&&(tid, _)| tid == thread_id)
            .map(|&(_, window)| window)
            .collect()
    }

    fn post_close(&self, window: WindowHandle) -> bool {
        let mut state = self.state();
        let Some(entry) = state
            .processes
            .values_mut()
            .find(|entry| entry.is_alive() && entry.process.owns_window(window))
        else {
            return false;
        };
        if !entry.process.ignored_windows.contains(&window) {
            if let (Some(delay), None) = (entry.process.closes_after, entry.exit_at) {
                entry.exit_at = Some(Instant::now() + delay);
            }
        }
        state.closed_windows.push(window);
        true
    }
}

impl PackageIntrospection for FakePlatform {
    fn is_supported(&self) -> bool {
        self.state().package_support
    }

    fn find_host(&self, aumid: &str) -> Option<u32> {
        let state = self.state();
        if !state.package_support {
            return None;
        }
        let pid = *state.hosts.get(aumid)?;
        state
            .processes
            .get(&pid)
            .filter(|entry| entry.is_alive())
            .map(|_| pid)
    }
}

impl PackageTerminator for FakePlatform {
    async fn terminate(&self, family: &str, timeout: Duration) -> TerminationStatus {
        let (status, panic) = {
            let mut state = self.state();
            state.terminations.push(family.to_string());
            (state.termination.clone(), state.panic_on_terminate)
        };
        if panic {
            panic!("termination helper crashed");
        }
        if status == TerminationStatus::TimedOut {
            tokio::time::sleep(timeout).await;
        }
        if matches!(status, TerminationStatus::Exited { code: 0, .. }) {
            for entry in self.state().processes.values_mut() {
                if entry.process.package.as_deref() == Some(family) {
                    entry.exit_now();
                }
            }
        }
        status
    }
}

impl Launcher for FakePlatform {
    fn launch_executable(&self, path: &Path) -> io::Result<u32> {
        let mut state = self.state();
        state.launches.push(path.to_path_buf());
        let process = state
            .launchable
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such executable"))?;
        let pid = process.pid;
        state.processes.insert(
            pid,
            Entry {
                process,
                exit_at: None,
            },
        );
        Ok(pid)
    }

    fn launch_package(&self, aumid: &str) -> io::Result<()> {
        let mut state = self.state();
        if !state.package_support {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "packaged applications require Windows",
            ));
        }
        state.package_launches.push(aumid.to_string());
        if let Some(process) = state.package_launchable.get(aumid).cloned() {
            state.processes.insert(
                process.pid,
                Entry {
                    process,
                    exit_at: None,
                },
            );
        }
        Ok(())
    }
}

impl Platform for FakePlatform {
    type Table = Self;
    type Windows = Self;
    type Packages = Self;
    type Terminator = Self;
    type Launcher = Self;

    fn table(&self) -> &Self {
        self
    }

    fn windows(&self) -> &Self {
        self
    }

    fn packages(&self) -> &Self {
        self
    }

    fn terminator(&self) -> &Self {
        self
    }

    fn launcher(&self) -> &Self {
        self
    }
}
