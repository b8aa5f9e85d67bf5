use std::{cell::Cell, ptr::NonNull};

use block2::RcBlock;
use objc2::{
    msg_send,
    rc::Retained,
    runtime::{NSObjectProtocol, ProtocolObject},
};
use objc2_app_kit::{
    NSRunningApplication, NSWorkspace, NSWorkspaceApplicationKey,
    NSWorkspaceDidActivateApplicationNotification,
};
use objc2_foundation::{MainThreadMarker, NSNotification, NSNotificationCenter};
use tracing::{debug, info, trace};

use crate::{ActivationEvent, Error};

thread_local! {
    /// Whether a guard is live on this (main) thread.
    static INSTALLED: Cell<bool> = const { Cell::new(false) };
}

/// Keeps the activation observer registered; removes it on drop.
pub struct WatcherGuard {
    /// Workspace notification center the observer is registered with.
    center: Retained<NSNotificationCenter>,
    /// Observer token returned at registration.
    token: Retained<ProtocolObject<dyn NSObjectProtocol>>,
}

impl Drop for WatcherGuard {
    fn drop(&mut self) {
        unsafe {
            let _: () = msg_send![&*self.center, removeObserver: &*self.token];
        }
        INSTALLED.with(|i| i.set(false));
        debug!("NSWorkspace activation observer removed");
    }
}

/// Describe `app` as an [`ActivationEvent`].
fn event_from(app: &NSRunningApplication) -> ActivationEvent {
    unsafe {
        ActivationEvent {
            pid: app.processIdentifier(),
            bundle_id: app.bundleIdentifier().map(|s| s.to_string()),
            name: app.localizedName().map(|s| s.to_string()),
        }
    }
}

/// Install the NSWorkspace activation observer on the current (main) thread.
///
/// `handler` runs on the main thread for every application activation,
/// including activations of this process. Events whose notification carries
/// no application are dropped. Only one observer may be live at a time.
pub fn install(handler: impl Fn(ActivationEvent) + 'static) -> Result<WatcherGuard, Error> {
    if MainThreadMarker::new().is_none() {
        return Err(Error::MainThread);
    }
    if INSTALLED.with(|i| i.replace(true)) {
        return Err(Error::AlreadyInstalled);
    }
    unsafe {
        let ws = NSWorkspace::sharedWorkspace();
        let center = ws.notificationCenter();
        let block = RcBlock::new(move |notif: NonNull<NSNotification>| {
            let notif = notif.as_ref();
            let Some(info) = notif.userInfo() else {
                trace!("activation without userInfo");
                return;
            };
            let Some(obj) = info.objectForKey(NSWorkspaceApplicationKey) else {
                trace!("activation without application");
                return;
            };
            if let Some(app) = obj.downcast_ref::<NSRunningApplication>() {
                handler(event_from(app));
            }
        });
        let token = center.addObserverForName_object_queue_usingBlock(
            Some(NSWorkspaceDidActivateApplicationNotification),
            None,
            None,
            &block,
        );
        info!("NSWorkspace activation observer installed");
        Ok(WatcherGuard { center, token })
    }
}
