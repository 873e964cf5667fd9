//! Win32 window enumeration and `WM_CLOSE` delivery

use super::{WindowHandle, WindowSystem};
use tracing::debug;
use windows::Win32::{
    Foundation::{CloseHandle, BOOL, HWND, LPARAM, TRUE, WPARAM},
    System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Thread32First, Thread32Next, TH32CS_SNAPTHREAD, THREADENTRY32,
    },
    UI::WindowsAndMessaging::{
        EnumThreadWindows, EnumWindows, GetWindow, GetWindowThreadProcessId, IsWindowVisible,
        PostMessageW, GW_OWNER, WM_CLOSE,
    },
};

/// Window primitives of the Windows desktop
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Windows;

impl WindowSystem for Win32Windows {
    fn thread_windows(&self, thread_id: u32) -> Vec<WindowHandle> {
        let mut hwnds: Vec<isize> = Vec::new();
        unsafe {
            let _ = EnumThreadWindows(
                thread_id,
                Some(collect_window),
                LPARAM(&mut hwnds as *mut Vec<isize> as isize),
            );
        }
        hwnds.into_iter().map(WindowHandle).collect()
    }

    fn post_close(&self, window: WindowHandle) -> bool {
        let hwnd = HWND(window.0 as *mut _);
        match unsafe { PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)) } {
            Ok(()) => true,
            Err(e) => {
                debug!(window = window.0, "PostMessageW(WM_CLOSE) failed: {}", e);
                false
            }
        }
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let hwnds = &mut *(lparam.0 as *mut Vec<isize>);
    hwnds.push(hwnd.0 as isize);
    TRUE
}

/// The window a user would consider the process's main window: the first
/// visible, unowned top-level window belonging to `pid`.
pub fn find_main_window(pid: u32) -> Option<WindowHandle> {
    let mut hwnds: Vec<isize> = Vec::new();
    unsafe {
        let _ = EnumWindows(
            Some(collect_window),
            LPARAM(&mut hwnds as *mut Vec<isize> as isize),
        );
    }

    hwnds.into_iter().find_map(|raw| {
        let hwnd = HWND(raw as *mut _);
        unsafe {
            let mut owner_pid = 0u32;
            GetWindowThreadProcessId(hwnd, Some(&mut owner_pid));
            if owner_pid != pid || !IsWindowVisible(hwnd).as_bool() {
                return None;
            }
            let owned = GetWindow(hwnd, GW_OWNER)
                .map(|owner| !owner.0.is_null())
                .unwrap_or(false);
            (!owned).then_some(WindowHandle(raw))
        }
    })
}

/// Ids of every thread owned by `pid`, from a Toolhelp snapshot
pub fn process_thread_ids(pid: u32) -> Vec<u32> {
    let mut threads = Vec::new();
    unsafe {
        let Ok(snapshot) = CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0) else {
            return threads;
        };

        let mut entry = THREADENTRY32 {
            dwSize: std::mem::size_of::<THREADENTRY32>() as u32,
            ..Default::default()
        };

        if Thread32First(snapshot, &mut entry).is_ok() {
            loop {
                if entry.th32OwnerProcessID == pid {
                    threads.push(entry.th32ThreadID);
                }
                if Thread32Next(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }

        let _ = CloseHandle(snapshot);
    }
    threads
}
