//! Helpers for end-to-end tests against real POSIX processes

#[cfg(unix)]
pub mod fixtures;
