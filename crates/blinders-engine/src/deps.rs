use std::time::{Duration, Instant};

use crate::{
    Result,
    geom::Rect,
    session::{AppIdentity, Pid},
    snapshot::{TrackedWindow, WindowId},
};

// ---- Collaborator abstractions ----
//
// Every OS touch point the engine needs is a trait here. The host binary
// supplies AppKit/CoreGraphics implementations; tests use the fakes in
// `test_support`.

/// Handle to one overlay surface owned by an [`OverlayHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Handle to a scheduled repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Per-process window geometry.
pub trait WindowSource {
    /// Qualifying windows of `pid` in canonical space; empty when nothing is
    /// visible or the registry is unreadable.
    fn list_windows(&self, pid: Pid) -> Vec<TrackedWindow>;
    /// Current frame of a window, re-read from the registry.
    fn window_frame(&self, id: WindowId) -> Option<Rect>;
    /// Whether the window is still present in the registry.
    fn window_exists(&self, id: WindowId) -> bool;
}

/// Creates, moves and removes cover surfaces.
pub trait OverlayHost {
    /// Show a new overlay covering `frame`.
    fn create(&mut self, frame: Rect) -> Result<OverlayId>;
    /// Move or resize an overlay in place.
    fn update_frame(&mut self, id: OverlayId, frame: Rect);
    /// Remove an overlay. Unknown ids are ignored.
    fn destroy(&mut self, id: OverlayId);
}

/// The engine's own process, excluded from distraction handling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnProcess {
    /// Our pid.
    pub pid: Pid,
    /// Our bundle identifier, when running from a bundle.
    pub bundle_id: Option<String>,
}

impl OwnProcess {
    /// True when `app` is this process.
    pub fn matches(&self, app: &AppIdentity) -> bool {
        if app.pid == self.pid {
            return true;
        }
        match (&self.bundle_id, &app.bundle_id) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => false,
        }
    }
}

/// Running applications and foreground control.
pub trait Workspace {
    /// Regular (Dock-visible) applications, in any order.
    fn running_applications(&self) -> Vec<AppIdentity>;
    /// Bring `pid` to the foreground. Returns false when it could not be
    /// activated (for example because it has exited).
    fn activate(&mut self, pid: Pid) -> bool;
    /// Identity of the engine's own process.
    fn own_process(&self) -> OwnProcess;
}

/// A connected display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    /// Display id.
    pub id: u32,
    /// Display frame in canonical space.
    pub frame: Rect,
}

/// Connected displays.
pub trait Displays {
    /// Every connected display; the primary first.
    fn screens(&self) -> Vec<Screen>;
}

/// Permission check for window geometry access.
pub trait CapabilityProbe {
    /// Whether other processes' window geometry can be enumerated.
    fn can_enumerate_windows(&self) -> bool;
}

/// Deterministic repeating timers driven by explicit instants.
pub trait Scheduler {
    /// Start a repeating timer; the first firing is one interval from now.
    fn start_repeating(&mut self, interval: Duration) -> TimerId;
    /// Cancel a timer. Unknown ids are ignored.
    fn cancel(&mut self, id: TimerId);
    /// Earliest pending deadline.
    fn next_deadline(&self) -> Option<Instant>;
    /// Timers due at `now`, rescheduled past `now` with missed ticks skipped.
    fn take_due(&mut self, now: Instant) -> Vec<TimerId>;
    /// Whether `id` is still scheduled.
    fn is_active(&self, id: TimerId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_process_matching() {
        let own = OwnProcess {
            pid: 999,
            bundle_id: Some("dev.blinders".into()),
        };
        assert!(own.matches(&AppIdentity::new(999, "x")));
        assert!(own.matches(&AppIdentity::new(5, "helper").with_bundle_id("dev.blinders")));
        assert!(!own.matches(&AppIdentity::new(5, "other").with_bundle_id("com.other")));
        assert!(!own.matches(&AppIdentity::new(5, "no bundle")));

        let unbundled = OwnProcess {
            pid: 1,
            bundle_id: None,
        };
        assert!(!unbundled.matches(&AppIdentity::new(5, "x").with_bundle_id("dev.blinders")));
    }
}
