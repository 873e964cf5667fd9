//! Run log directory and tracing setup

pub mod log_dir;
pub mod logging;
pub mod timestamp;
