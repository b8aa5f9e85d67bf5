//! mac-focus-watcher: observe foreground application changes on macOS.
//!
//! Integration overview:
//! - Call [`install`] on the main thread once the event loop exists, passing a
//!   handler that forwards [`ActivationEvent`]s into your loop (for example via
//!   a Tao `EventLoopProxy`).
//! - Keep the returned [`WatcherGuard`] alive for as long as events are
//!   wanted; dropping it removes the observer.
//!
//! Notifications are delivered on the main thread, which must be running an
//! AppKit run loop. No Accessibility permission is required.
#![cfg(target_os = "macos")]

mod event;
mod ns;

pub use event::ActivationEvent;
pub use ns::{WatcherGuard, install};

use thiserror::Error;

/// Errors that can occur when interacting with mac-focus-watcher public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The observer must be installed from the AppKit main thread.
    #[error("activation observer must be installed on the main thread")]
    MainThread,
    /// An observer is already registered; drop its guard first.
    #[error("activation observer already installed")]
    AlreadyInstalled,
}
