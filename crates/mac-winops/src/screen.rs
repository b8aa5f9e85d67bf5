//! Connected displays.

use core_graphics::display::CGDisplay;
use objc2_app_kit::NSScreen;
use objc2_foundation::MainThreadMarker;

use crate::{
    error::{Error, Result},
    geom::Frame,
};

/// A connected display in AppKit global coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenInfo {
    /// Position in `NSScreen.screens`; the primary display is `0`.
    pub id: u32,
    /// Full display frame, menu bar included.
    pub frame: Frame,
}

/// All connected displays, primary first.
///
/// Requires AppKit main thread.
pub fn screens() -> Result<Vec<ScreenInfo>> {
    let mtm = MainThreadMarker::new().ok_or(Error::MainThread)?;
    let screens = NSScreen::screens(mtm);
    Ok(screens
        .iter()
        .enumerate()
        .map(|(i, s)| ScreenInfo {
            id: i as u32,
            frame: Frame::from_ns(s.frame()),
        })
        .collect())
}

/// Height of the primary display (the one carrying the menu bar), the
/// reference for converting CoreGraphics window bounds to AppKit
/// coordinates. Safe to call from any thread.
pub fn primary_height() -> Option<f64> {
    let h = CGDisplay::main().bounds().size.height;
    (h > 0.0).then_some(h)
}
