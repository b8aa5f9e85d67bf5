use objc2_app_kit::{NSAlert, NSAlertFirstButtonReturn, NSAlertStyle, NSApplication};
use objc2_foundation::{MainThreadMarker, NSString};
use tracing::{debug, info, warn};

/// Alert title.
const TITLE: &str = "Screen Recording Permission Required";
/// Alert body.
const BODY: &str = "Blinders needs Screen Recording permission to detect window positions \
of other apps. This allows the overlay to cover only the distracting window instead of your \
entire screen.\n\nWithout this permission, Blinders will fall back to covering your entire \
screen when you get distracted.";

/// Explain the missing Screen Recording permission, offering to open System
/// Settings. Blocks in a modal loop until dismissed.
pub fn screen_recording_alert() {
    let Some(mtm) = MainThreadMarker::new() else {
        warn!("screen recording alert requested off the main thread");
        return;
    };
    let app = NSApplication::sharedApplication(mtm);
    #[allow(deprecated)]
    app.activateIgnoringOtherApps(true);

    let alert = NSAlert::new(mtm);
    alert.setMessageText(&NSString::from_str(TITLE));
    alert.setInformativeText(&NSString::from_str(BODY));
    alert.setAlertStyle(NSAlertStyle::Informational);
    alert.addButtonWithTitle(&NSString::from_str("Open System Settings"));
    alert.addButtonWithTitle(&NSString::from_str("Later"));

    if alert.runModal() == NSAlertFirstButtonReturn {
        info!("opening Screen Recording settings");
        // Registers the app in the Screen Recording list so it can be enabled.
        let granted = permissions::request_screen_recording();
        debug!(granted, "screen recording requested");
        if let Err(e) = permissions::open_screen_recording_settings() {
            warn!("failed to open System Settings: {}", e);
        }
    } else {
        info!("screen recording prompt dismissed");
    }
}
