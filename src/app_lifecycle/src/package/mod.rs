//! Packaged application support
//!
//! Packaged applications are identified by an application user model id
//! (AUMID) such as `Microsoft.WindowsCalculator_8wekyb3d8bbwe!App`. The part
//! before the first `!` is the package family, which scopes package-level
//! termination. Introspection of running packaged apps only exists on Windows;
//! other hosts get [`UnsupportedPackages`], which reports that it cannot help.

pub mod terminator;
pub mod unsupported;
#[cfg(windows)]
pub mod appx;

pub use terminator::{
    default_terminate_command, CommandTerminator, PackageTerminator, TerminationStatus,
};
pub use unsupported::UnsupportedPackages;

/// Separator between the package family and the application entry point
pub const AUMID_SEPARATOR: char = '!';

/// Default image name of the process hosting packaged application windows
pub const DEFAULT_HOST_PROCESS: &str = "ApplicationFrameHost.exe";

/// Locates the process currently presenting a packaged application's UI
pub trait PackageIntrospection {
    /// Whether this host can inspect packaged applications at all
    fn is_supported(&self) -> bool;

    /// Pid of the UI host whose command line mentions `aumid`
    fn find_host(&self, aumid: &str) -> Option<u32>;
}

/// Package family of an AUMID: everything before the first separator.
///
/// Returns `None` when that part is empty.
pub fn package_family(aumid: &str) -> Option<&str> {
    let family = aumid
        .split_once(AUMID_SEPARATOR)
        .map_or(aumid, |(family, _)| family)
        .trim();
    (!family.is_empty()).then_some(family)
}

/// First candidate whose command line contains `aumid`, ignoring case
pub fn select_host<'a, I>(candidates: I, aumid: &str) -> Option<u32>
where
    I: IntoIterator<Item = (u32, &'a str)>,
{
    let needle = aumid.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    candidates
        .into_iter()
        .find(|(_, cmdline)| cmdline.to_lowercase().contains(&needle))
        .map(|(pid, _)| pid)
}

#[cfg(windows)]
pub type HostPackages = appx::WindowsPackages;
#[cfg(not(windows))]
pub type HostPackages = UnsupportedPackages;
