//! Lifecycle management for a configured set of desktop applications.
//!
//! The heart of the crate is the [`escalation`] engine, which stops one
//! program by trying increasingly forceful strategies with bounded waits.
//! [`launch`] starts programs, and [`coordinator`] walks the configured
//! targets one after another. Every operating-system primitive sits behind
//! a trait bundled by [`platform::Platform`].

pub mod cli;
pub mod commands;
pub mod coordinator;
pub mod escalation;
pub mod launch;
pub mod package;
pub mod platform;
pub mod process;
pub mod target;
pub mod util;
pub mod window;

#[cfg(test)]
mod testing;
