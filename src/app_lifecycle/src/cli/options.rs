use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Start, stop and inspect a configured set of desktop applications
#[derive(Parser)]
#[command(name = "app_lifecycle")]
#[command(version)]
#[command(about = "Start, stop and inspect a configured set of desktop applications")]
#[command(after_help = "Examples:\n  \
    app_lifecycle start\n  \
    app_lifecycle stop --config lab.yaml\n  \
    app_lifecycle stop -p Notepad -p Calculator\n  \
    app_lifecycle status --quiet\n  \
    app_lifecycle session -p Notepad")]
#[command(arg_required_else_help = true)]
pub struct Options {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Launch every configured program, in order
    Start,

    /// Shut down every configured program, escalating as needed
    Stop,

    /// Show which configured programs are currently running
    Status,

    /// Start every program, wait for SIGINT/SIGTERM, then stop them again
    Session,
}

/// Options shared by every command
#[derive(Args, Clone, Debug)]
pub struct CommonOptions {
    /// Configuration file (YAML)
    #[arg(long, short = 'c', global = true, value_name = "PATH", default_value = "app_lifecycle.yaml")]
    pub config: PathBuf,

    /// Override the log directory from the configuration
    #[arg(long, global = true, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Only print warnings and errors on the console.
    /// The run log file always receives debug output.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Restrict the run to the named program (case-insensitive).
    /// Can be specified multiple times.
    #[arg(long = "program", short = 'p', global = true, value_name = "NAME")]
    pub programs: Vec<String>,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            config: PathBuf::from("app_lifecycle.yaml"),
            log_dir: None,
            quiet: false,
            programs: Vec::new(),
        }
    }
}
