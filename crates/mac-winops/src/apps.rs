//! Running applications and activation.

use std::process;

use objc2::{AllocAnyThread, rc::Retained};
use objc2_app_kit::{
    NSApplicationActivationOptions, NSApplicationActivationPolicy, NSImage, NSRunningApplication,
    NSWorkspace,
};
use objc2_foundation::{NSBundle, NSPoint, NSRect, NSSize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Edge length of the icons captured for menus, in points.
pub const ICON_SIZE: f64 = 18.0;

/// A running application as reported by `NSWorkspace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningApp {
    /// Process id.
    pub pid: i32,
    /// Bundle identifier, if any.
    pub bundle_id: Option<String>,
    /// Localized name, if any.
    pub name: Option<String>,
    /// Icon rendered at [`ICON_SIZE`] and encoded as TIFF.
    pub icon_tiff: Option<Vec<u8>>,
}

/// Applications with a regular activation policy (those shown in the Dock).
pub fn running_applications() -> Vec<RunningApp> {
    let ws = NSWorkspace::sharedWorkspace();
    let apps = ws.runningApplications();
    apps.iter()
        .filter(|a| unsafe { a.activationPolicy() } == NSApplicationActivationPolicy::Regular)
        .map(|a| RunningApp {
            pid: unsafe { a.processIdentifier() },
            bundle_id: unsafe { a.bundleIdentifier() }.map(|s| s.to_string()),
            name: unsafe { a.localizedName() }.map(|s| s.to_string()),
            icon_tiff: icon_tiff(&a),
        })
        .collect()
}

/// Downscale an application's icon and encode it as TIFF.
fn icon_tiff(app: &NSRunningApplication) -> Option<Vec<u8>> {
    let icon: Retained<NSImage> = unsafe { app.icon() }?;
    let size = NSSize::new(ICON_SIZE, ICON_SIZE);
    let small = NSImage::initWithSize(NSImage::alloc(), size);
    unsafe {
        #[allow(deprecated)]
        small.lockFocus();
        icon.drawInRect(NSRect::new(NSPoint::new(0.0, 0.0), size));
        #[allow(deprecated)]
        small.unlockFocus();
    }
    let data = small.TIFFRepresentation()?;
    Some(data.to_vec())
}

/// Bring the application with `pid` to the foreground with all its windows.
pub fn activate_pid(pid: i32) -> Result<()> {
    // SAFETY: Objective-C calls are performed with typed wrappers.
    let app = unsafe { NSRunningApplication::runningApplicationWithProcessIdentifier(pid) };
    let Some(app) = app else {
        return Err(Error::AppNotFound(pid));
    };
    #[allow(deprecated)]
    let ok = unsafe { app.activateWithOptions(NSApplicationActivationOptions::ActivateAllWindows) };
    if ok {
        debug!(pid, "activated app via NSRunningApplication");
        Ok(())
    } else {
        warn!(pid, "NSRunningApplication.activateWithOptions returned false");
        Err(Error::ActivationFailed)
    }
}

/// This process's pid and bundle identifier (absent when not run from an
/// app bundle).
pub fn own_process() -> (i32, Option<String>) {
    let pid = process::id() as i32;
    let bundle = unsafe { NSBundle::mainBundle().bundleIdentifier() }.map(|s| s.to_string());
    (pid, bundle)
}
