//! Program targets
//!
//! A [`ProgramTarget`] is the validated, immutable description of one program
//! the tool manages. Targets are produced by the configuration loader and are
//! never modified afterwards.

use std::{fmt, path::PathBuf};

/// Process model of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    /// A conventional executable started by path
    NativeExecutable,
    /// A sandboxed packaged application identified by its AUMID
    PackagedApp,
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessKind::NativeExecutable => f.write_str("native"),
            ProcessKind::PackagedApp => f.write_str("packaged"),
        }
    }
}

/// Where a target is launched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Filesystem path of the executable
    Executable(PathBuf),
    /// Application user model identifier, e.g. `Vendor.App_xyz!App`
    Package(String),
}

/// One program managed by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramTarget {
    /// Display name used in logs
    pub name: String,
    /// How the program is started
    pub locator: Locator,
    /// Running process name looked up after launch and during shutdown
    pub process_name: String,
}

impl ProgramTarget {
    /// Build a native executable target
    pub fn native(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        process_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            locator: Locator::Executable(path.into()),
            process_name: process_name.into(),
        }
    }

    /// Build a packaged application target
    pub fn packaged(
        name: impl Into<String>,
        aumid: impl Into<String>,
        process_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            locator: Locator::Package(aumid.into()),
            process_name: process_name.into(),
        }
    }

    pub fn kind(&self) -> ProcessKind {
        match self.locator {
            Locator::Executable(_) => ProcessKind::NativeExecutable,
            Locator::Package(_) => ProcessKind::PackagedApp,
        }
    }

    /// The AUMID of a packaged target
    pub fn aumid(&self) -> Option<&str> {
        match &self.locator {
            Locator::Package(aumid) => Some(aumid),
            Locator::Executable(_) => None,
        }
    }
}
