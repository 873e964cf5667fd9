//! Command-line options and configuration file handling

pub mod config;
pub mod options;
