//! Simple, macOS-only permission checks for Blinders.
//!
//! Covering other applications' windows needs their bounds, which macOS only
//! reports to processes holding the Screen Recording permission. This crate
//! exposes a minimal API to query that permission, ask the system to prompt
//! for it, and open the matching System Settings pane.
//!
//! Notes
//! - `screen_recording_ok()` is fast and side-effect free.
//! - `request_screen_recording()` may show the system prompt once per launch.
//! - `accessibility_ok()` is reported for diagnostics only; nothing in
//!   Blinders requires it.
#![cfg(target_os = "macos")]

use std::{io, process::Command};

use serde::Serialize;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn CGPreflightScreenCaptureAccess() -> bool;
    fn CGRequestScreenCaptureAccess() -> bool;
}

/// System Settings deep link to Privacy & Security > Screen Recording.
pub const SCREEN_RECORDING_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_ScreenCapture";

/// Check if the application has the "Accessibility" permission.
pub fn accessibility_ok() -> bool {
    unsafe { AXIsProcessTrusted() }
}

/// Check if the application has the "Screen Recording" permission.
///
/// Returns `true` when the process may read other processes' window bounds
/// via `CGWindowListCopyWindowInfo`, and `false` otherwise.
pub fn screen_recording_ok() -> bool {
    unsafe { CGPreflightScreenCaptureAccess() }
}

/// Ask macOS to prompt for Screen Recording. Returns the current grant.
///
/// A grant usually only takes effect after the process restarts.
pub fn request_screen_recording() -> bool {
    unsafe { CGRequestScreenCaptureAccess() }
}

/// Open System Settings at the Screen Recording pane.
pub fn open_screen_recording_settings() -> io::Result<()> {
    Command::new("open")
        .arg(SCREEN_RECORDING_SETTINGS_URL)
        .status()
        .and_then(|st| {
            if st.success() {
                Ok(())
            } else {
                Err(io::Error::other(format!("open exited with {st}")))
            }
        })
}

/// Current permission status for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionsStatus {
    /// Accessibility (AX) permission; `true` if granted.
    pub accessibility_ok: bool,
    /// Screen Recording permission; `true` if granted.
    pub screen_recording_ok: bool,
}

/// Query all permissions Blinders cares about.
///
/// The function performs no prompting and has no side effects.
pub fn check_permissions() -> PermissionsStatus {
    PermissionsStatus {
        accessibility_ok: accessibility_ok(),
        screen_recording_ok: screen_recording_ok(),
    }
}
