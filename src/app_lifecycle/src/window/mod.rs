//! Cooperative close through window messaging
//!
//! On Windows a close request is a `WM_CLOSE` posted to a top-level window.
//! POSIX hosts have no addressable windows, so the process itself stands in
//! for its main window and the close request is `SIGTERM`.

pub mod messenger;
#[cfg(unix)]
pub mod posix;
#[cfg(windows)]
pub mod win32;

pub use messenger::WindowMessenger;

/// Opaque handle of a closable top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub isize);

/// Window enumeration and close-request primitives
pub trait WindowSystem {
    /// Top-level windows owned by one execution thread
    fn thread_windows(&self, thread_id: u32) -> Vec<WindowHandle>;

    /// Post a close request; returns whether the request was delivered
    fn post_close(&self, window: WindowHandle) -> bool;
}

#[cfg(windows)]
pub type NativeWindows = win32::Win32Windows;
#[cfg(unix)]
pub type NativeWindows = posix::PosixWindows;
