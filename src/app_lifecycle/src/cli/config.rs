//! Configuration file loading and validation
//!
//! The configuration is a YAML document listing the programs to manage plus
//! optional timeouts and packaged-app settings. Everything is validated up
//! front; a defect here aborts the run before any program is touched.

use crate::{
    package::{default_terminate_command, package_family, DEFAULT_HOST_PROCESS},
    target::ProgramTarget,
};
use eyre::Context;
use serde::Deserialize;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Default base directory for run logs
pub const DEFAULT_LOG_DIR: &str = "app_lifecycle_log";

/// A configuration defect
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("no programs are configured")]
    NoPrograms,
    #[error("program #{index} has no name")]
    MissingName { index: usize },
    #[error("native program '{program}' has no path")]
    MissingPath { program: String },
    #[error("packaged program '{program}' has no aumid")]
    MissingAumid { program: String },
    #[error("packaged program '{program}' has aumid '{aumid}' without a package family")]
    InvalidAumid { program: String, aumid: String },
    #[error("program '{program}' has no process_name")]
    MissingProcessName { program: String },
    #[error("program '{program}' is configured more than once")]
    DuplicateName { program: String },
    #[error("packages.terminate_command is empty")]
    EmptyTerminateCommand,
    #[error("no configured program is named '{0}'")]
    UnknownProgram(String),
}

/// Bounded waits of the shutdown and launch sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub graceful_close: Duration,
    pub package_terminate: Duration,
    pub kill_confirm: Duration,
    pub launch_settle: Duration,
    pub inter_target_pause: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        TimeoutsSection::default().into()
    }
}

/// Packaged application settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PackageSettings {
    /// Image name of the process presenting packaged app windows
    pub host_process: String,
    /// Package termination command; `{family}` is replaced by the package family
    pub terminate_command: Vec<String>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            host_process: DEFAULT_HOST_PROCESS.to_string(),
            terminate_command: default_terminate_command(),
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub log_dir: PathBuf,
    pub timeouts: Timeouts,
    pub packages: PackageSettings,
    /// Programs in configuration order
    pub programs: Vec<ProgramTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default = "default_log_dir")]
    log_dir: PathBuf,
    #[serde(default)]
    timeouts: TimeoutsSection,
    #[serde(default)]
    packages: PackageSettings,
    #[serde(default)]
    programs: Vec<ProgramEntry>,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct TimeoutsSection {
    graceful_close_ms: u64,
    package_terminate_ms: u64,
    kill_confirm_ms: u64,
    launch_settle_ms: u64,
    inter_target_pause_ms: u64,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self {
            graceful_close_ms: 5000,
            package_terminate_ms: 5000,
            kill_confirm_ms: 5000,
            launch_settle_ms: 3000,
            inter_target_pause_ms: 1000,
        }
    }
}

impl From<TimeoutsSection> for Timeouts {
    fn from(section: TimeoutsSection) -> Self {
        Self {
            graceful_close: Duration::from_millis(section.graceful_close_ms),
            package_terminate: Duration::from_millis(section.package_terminate_ms),
            kill_confirm: Duration::from_millis(section.kill_confirm_ms),
            launch_settle: Duration::from_millis(section.launch_settle_ms),
            inter_target_pause: Duration::from_millis(section.inter_target_pause_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProgramKind {
    Native,
    Packaged,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramEntry {
    #[serde(default)]
    name: Option<String>,
    kind: ProgramKind,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    aumid: Option<String>,
    #[serde(default)]
    process_name: Option<String>,
}

/// Trimmed, non-empty value of an optional string field
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl ProgramEntry {
    fn into_target(self, index: usize) -> Result<ProgramTarget, ConfigError> {
        let name = non_blank(self.name).ok_or(ConfigError::MissingName { index })?;
        let process_name = non_blank(self.process_name).ok_or_else(|| {
            ConfigError::MissingProcessName {
                program: name.clone(),
            }
        })?;

        match self.kind {
            ProgramKind::Native => {
                let path = self
                    .path
                    .filter(|p| !p.as_os_str().is_empty())
                    .ok_or_else(|| ConfigError::MissingPath {
                        program: name.clone(),
                    })?;
                Ok(ProgramTarget::native(name, path, process_name))
            }
            ProgramKind::Packaged => {
                let aumid = non_blank(self.aumid).ok_or_else(|| ConfigError::MissingAumid {
                    program: name.clone(),
                })?;
                if package_family(&aumid).is_none() {
                    return Err(ConfigError::InvalidAumid {
                        program: name,
                        aumid,
                    });
                }
                Ok(ProgramTarget::packaged(name, aumid, process_name))
            }
        }
    }
}

impl Config {
    /// Read and validate the configuration file at `path`
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("unable to read configuration file {}", path.display()))?;
        Self::from_yaml(&text)
            .wrap_err_with(|| format!("invalid configuration file {}", path.display()))
    }

    /// Parse and validate a YAML configuration document
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(text)?;

        if file.packages.terminate_command.is_empty()
            || file.packages.terminate_command[0].trim().is_empty()
        {
            return Err(ConfigError::EmptyTerminateCommand);
        }
        if file.programs.is_empty() {
            return Err(ConfigError::NoPrograms);
        }

        let mut seen = HashSet::new();
        let mut programs = Vec::with_capacity(file.programs.len());
        for (index, entry) in file.programs.into_iter().enumerate() {
            let target = entry.into_target(index)?;
            if !seen.insert(target.name.to_lowercase()) {
                return Err(ConfigError::DuplicateName {
                    program: target.name,
                });
            }
            programs.push(target);
        }

        Ok(Self {
            log_dir: file.log_dir,
            timeouts: file.timeouts.into(),
            packages: file.packages,
            programs,
        })
    }

    /// Programs selected by name, in configuration order.
    ///
    /// An empty selection means every program. Names are matched
    /// case-insensitively and an unknown name is an error.
    pub fn select(&self, names: &[String]) -> Result<Vec<ProgramTarget>, ConfigError> {
        if names.is_empty() {
            return Ok(self.programs.clone());
        }

        if let Some(unknown) = names.iter().find(|name| {
            !self
                .programs
                .iter()
                .any(|p| p.name.eq_ignore_ascii_case(name.trim()))
        }) {
            return Err(ConfigError::UnknownProgram(unknown.clone()));
        }

        Ok(self
            .programs
            .iter()
            .filter(|p| names.iter().any(|name| p.name.eq_ignore_ascii_case(name.trim())))
            .cloned()
            .collect())
    }
}
