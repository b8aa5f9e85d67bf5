//! mac-winops: macOS window registry, displays, applications and overlays
//! for Blinders.
//!
//! - [`on_screen_windows`]: CoreGraphics window list (id, owner, layer, bounds)
//! - [`screens`] and [`primary_height`]: connected displays
//! - [`running_applications`], [`activate_pid`], [`own_process`]: NSWorkspace
//! - [`OverlayWindow`]: the cover surface
//!
//! Nothing here requires Accessibility permission. Reading other processes'
//! window bounds requires Screen Recording permission on recent macOS.
#![cfg(target_os = "macos")]

mod apps;
mod cfutil;
mod error;
mod geom;
pub mod overlay;
mod screen;
mod window;

/// Alias for CoreGraphics CGWindowID (kCGWindowNumber).
pub type WindowId = u32;

pub use apps::{ICON_SIZE, RunningApp, activate_pid, own_process, running_applications};
pub use error::{Error, Result};
pub use geom::Frame;
pub use overlay::{OverlayAppearance, OverlayWindow};
pub use screen::{ScreenInfo, primary_height, screens};
pub use window::{WindowRow, on_screen_windows};
