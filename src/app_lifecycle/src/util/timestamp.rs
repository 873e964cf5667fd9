//! Timestamps naming run directories

use chrono::{DateTime, Local};

/// `strftime` pattern of run directory names: `YYYY-MM-DD_HH-MM-SS`
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub fn run_dir_name(at: DateTime<Local>) -> String {
    at.format(RUN_DIR_FORMAT).to_string()
}
