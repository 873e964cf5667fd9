//! Operating-system capabilities bundled for the core

use crate::{
    cli::config::PackageSettings,
    launch::{Launcher, SystemLauncher},
    package::{CommandTerminator, HostPackages, PackageIntrospection, PackageTerminator},
    process::{ProcessTable, SystemProcessTable},
    window::{NativeWindows, WindowSystem},
};

/// Every OS primitive the escalation engine and launch orchestrator need.
///
/// The host implementation is chosen at compile time, so the core never
/// branches on the platform itself.
pub trait Platform {
    type Table: ProcessTable;
    type Windows: WindowSystem;
    type Packages: PackageIntrospection;
    type Terminator: PackageTerminator;
    type Launcher: Launcher;

    fn table(&self) -> &Self::Table;
    fn windows(&self) -> &Self::Windows;
    fn packages(&self) -> &Self::Packages;
    fn terminator(&self) -> &Self::Terminator;
    fn launcher(&self) -> &Self::Launcher;
}

/// The host this binary runs on
#[derive(Debug)]
pub struct SystemPlatform {
    table: SystemProcessTable,
    windows: NativeWindows,
    packages: HostPackages,
    terminator: CommandTerminator,
    launcher: SystemLauncher,
}

impl SystemPlatform {
    pub fn new(packages: &PackageSettings) -> Self {
        Self {
            table: SystemProcessTable::new(),
            windows: NativeWindows::default(),
            packages: HostPackages::new(&packages.host_process),
            terminator: CommandTerminator::new(packages.terminate_command.clone()),
            launcher: SystemLauncher,
        }
    }
}

impl Platform for SystemPlatform {
    type Table = SystemProcessTable;
    type Windows = NativeWindows;
    type Packages = HostPackages;
    type Terminator = CommandTerminator;
    type Launcher = SystemLauncher;

    fn table(&self) -> &Self::Table {
        &self.table
    }

    fn windows(&self) -> &Self::Windows {
        &self.windows
    }

    fn packages(&self) -> &Self::Packages {
        &self.packages
    }

    fn terminator(&self) -> &Self::Terminator {
        &self.terminator
    }

    fn launcher(&self) -> &Self::Launcher {
        &self.launcher
    }
}
