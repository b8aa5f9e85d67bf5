use core_foundation::{base::TCFTypeRef, dictionary::CFDictionaryRef};
use core_graphics::window::{
    copy_window_info, kCGNullWindowID, kCGWindowBounds, kCGWindowLayer,
    kCGWindowListExcludeDesktopElements, kCGWindowListOptionOnScreenOnly, kCGWindowNumber,
    kCGWindowOwnerPID,
};
use tracing::{trace, warn};

use crate::{
    WindowId,
    cfutil::{dict_get_frame, dict_get_i32},
    geom::Frame,
};

/// One on-screen window as reported by the CoreGraphics window list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRow {
    /// `kCGWindowNumber`.
    pub id: WindowId,
    /// `kCGWindowOwnerPID`.
    pub pid: i32,
    /// `kCGWindowLayer`; `0` for normal application windows.
    pub layer: i32,
    /// `kCGWindowBounds`, top-left origin.
    pub bounds: Frame,
}

/// Snapshot of on-screen, non-desktop windows in front-to-back order.
///
/// Returns `None` when the window server gives no list at all. Without Screen
/// Recording permission the list is still returned, but bounds of other
/// processes' windows may be missing; such rows are skipped.
pub fn on_screen_windows() -> Option<Vec<WindowRow>> {
    let options = kCGWindowListOptionOnScreenOnly | kCGWindowListExcludeDesktopElements;
    let Some(arr) = copy_window_info(options, kCGNullWindowID) else {
        warn!("on_screen_windows: window list unavailable");
        return None;
    };
    let rows: Vec<WindowRow> = arr
        .iter()
        .filter_map(|item| {
            // SAFETY: every element of the window info array is a CFDictionary
            // that lives as long as `arr`.
            let d = unsafe { CFDictionaryRef::from_void_ptr(*item) };
            parse_row(d)
        })
        .collect();
    trace!(count = rows.len(), "on_screen_windows");
    Some(rows)
}

/// Read one window-info dictionary; rows missing a field are dropped.
fn parse_row(d: CFDictionaryRef) -> Option<WindowRow> {
    if d.is_null() {
        return None;
    }
    let (id, pid, layer) = unsafe {
        (
            dict_get_i32(d, kCGWindowNumber)?,
            dict_get_i32(d, kCGWindowOwnerPID)?,
            dict_get_i32(d, kCGWindowLayer)?,
        )
    };
    let id = WindowId::try_from(id).ok().filter(|n| *n > 0)?;
    let Some(bounds) = (unsafe { dict_get_frame(d, kCGWindowBounds) }) else {
        trace!(id, pid, "window without bounds");
        return None;
    };
    Some(WindowRow {
        id,
        pid,
        layer,
        bounds,
    })
}
