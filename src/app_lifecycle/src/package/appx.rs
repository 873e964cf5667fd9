//! Packaged application introspection on Windows

use super::{select_host, PackageIntrospection};
use crate::process::{process_name_matches, system::{is_live, SystemProcessTable}};
use tracing::debug;

/// Finds packaged application UI hosts by their launch command line
#[derive(Debug, Clone)]
pub struct WindowsPackages {
    host_process: String,
}

impl WindowsPackages {
    pub fn new(host_process: &str) -> Self {
        Self {
            host_process: host_process.to_string(),
        }
    }
}

impl PackageIntrospection for WindowsPackages {
    fn is_supported(&self) -> bool {
        true
    }

    fn find_host(&self, aumid: &str) -> Option<u32> {
        let sys = SystemProcessTable::snapshot_with_cmdlines();
        let mut hosts: Vec<(u32, String)> = sys
            .processes()
            .iter()
            .filter(|(_, process)| is_live(process))
            .filter(|(_, process)| {
                process_name_matches(&process.name().to_string_lossy(), &self.host_process)
            })
            .map(|(pid, process)| {
                let cmdline = process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ");
                (pid.as_u32(), cmdline)
            })
            .collect();
        hosts.sort_by_key(|(pid, _)| *pid);
        debug!(
            host_process = %self.host_process,
            "Inspecting {} package host process(es)",
            hosts.len()
        );

        select_host(hosts.iter().map(|(pid, cmd)| (*pid, cmd.as_str())), aumid)
    }
}
