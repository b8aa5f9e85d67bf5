//! Blinders Engine
//!
//! The engine runs a focus session:
//! - tracks the session phase (inactive, on target, distracted)
//! - reacts to foreground activation events
//! - covers a distracting application's windows with overlays and keeps them
//!   aligned through a reconciliation poll
//! - falls back to full-screen covering when window geometry is unavailable
//!
//! Everything the engine touches in the OS goes through the traits in
//! [`deps`], bundled as [`Services`]. The engine is a single-threaded state
//! machine: the host calls into it from its event loop and drives the poll
//! timer with [`Engine::next_deadline`] and [`Engine::run_due`].
use std::{
    collections::{BTreeMap, HashSet},
    mem,
    time::{Duration, Instant},
};

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, trace, warn};

pub mod deps;
mod error;
pub mod geom;
mod notification;
pub mod reconcile;
mod services;
pub mod session;
pub mod snapshot;
mod ticker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use deps::{
    CapabilityProbe, Displays, OverlayHost, OverlayId, OwnProcess, Scheduler, Screen, TimerId,
    WindowSource, Workspace,
};
pub use error::{Error, Result};
pub use geom::Rect;
pub use notification::{Notifier, SessionEvent};
pub use services::Services;
pub use session::{AppIcon, AppIdentity, CoverMode, Pid, Session, SessionSnapshot, SessionState};
pub use snapshot::{RawWindow, SnapshotProvider, TrackedWindow, WindowId, WindowRegistry};
pub use ticker::Ticker;

/// An overlay covering one tracked window.
#[derive(Clone, Copy, Debug)]
struct Covered {
    /// Overlay handle.
    overlay: OverlayId,
    /// Frame the overlay was last placed at.
    frame: Rect,
}

/// Overlays currently owned by the engine. Window-keyed and full-screen
/// covering are mutually exclusive.
#[derive(Debug, Default)]
enum Cover {
    /// Nothing covered.
    #[default]
    None,
    /// One overlay per window of `pid`.
    Windows {
        /// Process whose windows are covered.
        pid: Pid,
        /// Overlays keyed by window id.
        overlays: BTreeMap<WindowId, Covered>,
    },
    /// One overlay per display, keyed by screen id.
    FullScreen(Vec<(u32, OverlayId)>),
}

impl Cover {
    /// Observable summary.
    fn mode(&self) -> CoverMode {
        match self {
            Self::None => CoverMode::None,
            Self::Windows { overlays, .. } => CoverMode::Windows(overlays.len()),
            Self::FullScreen(list) => CoverMode::FullScreen(list.len()),
        }
    }
}

/// Focus session state machine and sole owner of overlay lifecycle.
///
/// Construct with [`Engine::new`], then feed it activation events via
/// [`Engine::on_activation`] and timer wakeups via [`Engine::run_due`].
pub struct Engine {
    /// OS collaborators.
    services: Services,
    /// Session fields.
    session: Session,
    /// Target picked by the user; survives `stop_session`.
    selected: Option<AppIdentity>,
    /// Live overlays.
    cover: Cover,
    /// Current reconciliation timer.
    poll: Option<TimerId>,
    /// Reconciliation period.
    poll_interval: Duration,
    /// Frame change tolerance for reconciliation.
    frame_epsilon: f64,
    /// Our own process, never treated as a distraction.
    own: OwnProcess,
    /// Observers.
    notifier: Notifier,
    /// Last snapshot sent, to suppress duplicate notifications.
    last_published: Option<SessionSnapshot>,
    /// Whether the capability notice went out already.
    capability_notice_sent: bool,
}

impl Engine {
    /// Create an engine over `services` using the timing values in `settings`.
    pub fn new(services: Services, settings: &config::EngineSettings) -> Self {
        let own = services.workspace.own_process();
        debug!(pid = own.pid, bundle = ?own.bundle_id, "engine_new");
        Self {
            services,
            session: Session::default(),
            selected: None,
            cover: Cover::None,
            poll: None,
            poll_interval: settings.poll_interval(),
            frame_epsilon: settings.frame_epsilon,
            own,
            notifier: Notifier::new(),
            last_published: None,
            capability_notice_sent: false,
        }
    }

    // ---- Observable state ----

    /// Session fields.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current phase.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Focus target of the running session.
    pub fn target(&self) -> Option<&AppIdentity> {
        self.session.target()
    }

    /// Application being covered.
    pub fn distracting(&self) -> Option<&AppIdentity> {
        self.session.distracting()
    }

    /// Target picked with [`Engine::select_target`].
    pub fn selected(&self) -> Option<&AppIdentity> {
        self.selected.as_ref()
    }

    /// Current covering mode.
    pub fn cover_mode(&self) -> CoverMode {
        self.cover.mode()
    }

    /// Window ids and frames currently covered, in id order.
    pub fn covered_windows(&self) -> Vec<(WindowId, Rect)> {
        match &self.cover {
            Cover::Windows { overlays, .. } => {
                overlays.iter().map(|(id, c)| (*id, c.frame)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Whether the reconciliation timer is scheduled.
    pub fn is_polling(&self) -> bool {
        self.poll
            .is_some_and(|id| self.services.scheduler.is_active(id))
    }

    /// Observable copy of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.session.state(),
            target: self.session.target().cloned(),
            distracting: self.session.distracting().cloned(),
            selected: self.selected.clone(),
            cover: self.cover.mode(),
        }
    }

    /// Subscribe to session events. The current snapshot is sent right away.
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        let snap = self.snapshot();
        let rx = self.notifier.subscribe_with(SessionEvent::Changed(snap.clone()));
        self.last_published = Some(snap);
        rx
    }

    /// Regular, named applications sorted case-insensitively by name.
    pub fn running_applications(&self) -> Vec<AppIdentity> {
        let mut seen = HashSet::new();
        let mut apps: Vec<AppIdentity> = self
            .services
            .workspace
            .running_applications()
            .into_iter()
            .filter(|a| !a.name.trim().is_empty())
            .filter(|a| seen.insert(a.pid))
            .collect();
        apps.sort_by_cached_key(|a| (a.name.to_lowercase(), a.pid));
        apps
    }

    // ---- Commands ----

    /// Record the target to use for the next [`Engine::start_session`].
    pub fn select_target(&mut self, app: AppIdentity) {
        debug!(app = %app, "select_target");
        self.selected = Some(app);
        self.publish_if_changed();
    }

    /// Start a session on the selected target. Returns false when nothing is
    /// selected or the selection is no longer running.
    pub fn start_session(&mut self) -> bool {
        match self.selected.clone() {
            Some(target) => self.start_session_with(&target),
            None => {
                debug!("start_session: no target selected");
                false
            }
        }
    }

    /// Start a session on `target`. No-op returning false when `target` is
    /// not among the running applications.
    pub fn start_session_with(&mut self, target: &AppIdentity) -> bool {
        let Some(live) = self
            .running_applications()
            .into_iter()
            .find(|a| a == target)
        else {
            debug!(app = %target, "start_session: target not running");
            return false;
        };
        self.clear_cover();
        self.session.begin(live.clone());
        self.selected = Some(live.clone());
        if !self.services.workspace.activate(live.pid) {
            debug!(app = %live, "start_session: activation failed");
        }
        info!(target = %live, "session_started");
        self.publish_if_changed();
        true
    }

    /// End the session from any state, removing every overlay and the timer.
    pub fn stop_session(&mut self) {
        let was = self.session.state();
        self.clear_cover();
        self.session.end();
        if was.is_active() {
            info!("session_stopped");
        }
        self.publish_if_changed();
    }

    /// Bring the target back to the front and uncover. Only acts while
    /// distracted; a target that has exited is tolerated.
    pub fn return_to_target(&mut self) {
        if self.session.state() != SessionState::Distracted {
            trace!(state = ?self.session.state(), "return_to_target ignored");
            return;
        }
        if let Some(pid) = self.session.target().map(|t| t.pid)
            && !self.services.workspace.activate(pid)
        {
            debug!(pid, "return_to_target: target could not be activated");
        }
        self.clear_cover();
        self.session.back_on_target();
        info!("returned_to_target");
        self.publish_if_changed();
    }

    /// Remove all overlays and timers, leaving the session fields untouched.
    /// Called by the host before exit; also run on drop.
    pub fn shutdown(&mut self) {
        self.clear_cover();
    }

    // ---- Events ----

    /// Handle a foreground activation.
    pub fn on_activation(&mut self, app: &AppIdentity) {
        if !self.session.state().is_active() {
            trace!(app = %app, "activation ignored: no session");
            return;
        }
        if self.own.matches(app) {
            trace!(app = %app, "activation ignored: own process");
            return;
        }
        if self.session.target() == Some(app) {
            if self.session.state() == SessionState::Distracted {
                self.clear_cover();
                self.session.back_on_target();
                info!(app = %app, "back_on_target");
            }
            self.publish_if_changed();
            return;
        }
        let again = self.session.distracting() == Some(app);
        self.clear_cover();
        if again {
            debug!(app = %app, "distracting app reactivated: recovering");
        } else {
            self.session.distract(app.clone());
            info!(app = %app, "distracted");
        }
        self.cover_app(app.pid);
        self.publish_if_changed();
    }

    /// Handle a firing of timer `id`. Ticks for timers other than the
    /// current poll are discarded.
    pub fn on_poll_tick(&mut self, id: TimerId) {
        if self.poll != Some(id) {
            trace!(timer = id.0, "stale tick discarded");
            self.services.scheduler.cancel(id);
            return;
        }
        if self.session.state() != SessionState::Distracted {
            self.stop_poll();
            return;
        }
        self.reconcile();
        self.publish_if_changed();
    }

    /// Earliest instant at which [`Engine::run_due`] has work.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.services.scheduler.next_deadline()
    }

    /// Fire every timer due at `now`.
    pub fn run_due(&mut self, now: Instant) {
        for id in self.services.scheduler.take_due(now) {
            self.on_poll_tick(id);
        }
    }

    // ---- Covering ----

    /// Entry procedure for `Distracted`.
    fn cover_app(&mut self, pid: Pid) {
        if !self.services.probe.can_enumerate_windows() {
            if !self.capability_notice_sent {
                self.capability_notice_sent = true;
                self.notifier.publish(SessionEvent::CapabilityDenied);
            }
            debug!(pid, "window geometry unavailable: full-screen cover");
            self.cover_full_screen();
            return;
        }

        let windows = self.services.windows.list_windows(pid);
        if windows.is_empty() {
            debug!(pid, "no qualifying windows: full-screen cover");
            self.cover_full_screen();
            return;
        }

        let mut overlays = BTreeMap::new();
        for w in windows {
            if overlays.contains_key(&w.id) {
                continue;
            }
            match self.services.overlays.create(w.frame) {
                Ok(overlay) => {
                    overlays.insert(
                        w.id,
                        Covered {
                            overlay,
                            frame: w.frame,
                        },
                    );
                }
                Err(e) => warn!(window = w.id, error = %e, "overlay create failed"),
            }
        }
        if overlays.is_empty() {
            debug!(pid, "no window overlay created: full-screen cover");
            self.cover_full_screen();
            return;
        }
        debug!(pid, count = overlays.len(), "covering windows");
        self.cover = Cover::Windows { pid, overlays };
        self.start_poll();
    }

    /// Fallback: one overlay per connected display, no polling.
    fn cover_full_screen(&mut self) {
        self.stop_poll();
        let screens = self.services.displays.screens();
        if screens.is_empty() {
            warn!("no displays reported; nothing to cover");
        }
        let mut list = Vec::with_capacity(screens.len());
        for s in screens {
            match self.services.overlays.create(s.frame) {
                Ok(overlay) => list.push((s.id, overlay)),
                Err(e) => warn!(screen = s.id, error = %e, "full-screen overlay create failed"),
            }
        }
        debug!(count = list.len(), "covering screens");
        self.cover = Cover::FullScreen(list);
    }

    /// One reconciliation pass over the covered windows.
    fn reconcile(&mut self) {
        let (pid, mut overlays) = match mem::take(&mut self.cover) {
            Cover::Windows { pid, overlays } => (pid, overlays),
            other => {
                self.cover = other;
                self.stop_poll();
                return;
            }
        };

        let fresh = self.services.windows.list_windows(pid);
        let current: BTreeMap<WindowId, Rect> =
            overlays.iter().map(|(id, c)| (*id, c.frame)).collect();
        let plan = reconcile::plan(&current, &fresh, self.frame_epsilon);
        if !plan.is_empty() {
            trace!(
                remove = plan.remove.len(),
                add = plan.add.len(),
                moved = plan.moved.len(),
                "reconcile"
            );
        }

        for id in plan.remove {
            if let Some(c) = overlays.remove(&id) {
                trace!(window = id, "window gone");
                self.services.overlays.destroy(c.overlay);
            }
        }
        for (id, frame) in plan.moved {
            if let Some(c) = overlays.get_mut(&id) {
                self.services.overlays.update_frame(c.overlay, frame);
                c.frame = frame;
            }
        }
        for w in plan.add {
            match self.services.overlays.create(w.frame) {
                Ok(overlay) => {
                    trace!(window = w.id, "window opened");
                    overlays.insert(
                        w.id,
                        Covered {
                            overlay,
                            frame: w.frame,
                        },
                    );
                }
                Err(e) => warn!(window = w.id, error = %e, "overlay create failed"),
            }
        }

        if overlays.is_empty() {
            debug!(pid, "last covered window gone: full-screen cover");
            self.cover_full_screen();
        } else {
            self.cover = Cover::Windows { pid, overlays };
        }
    }

    /// Destroy every overlay and cancel the poll.
    fn clear_cover(&mut self) {
        self.stop_poll();
        match mem::take(&mut self.cover) {
            Cover::None => {}
            Cover::Windows { overlays, .. } => {
                for c in overlays.into_values() {
                    self.services.overlays.destroy(c.overlay);
                }
            }
            Cover::FullScreen(list) => {
                for (_, overlay) in list {
                    self.services.overlays.destroy(overlay);
                }
            }
        }
    }

    /// (Re)start the reconciliation timer.
    fn start_poll(&mut self) {
        self.stop_poll();
        self.poll = Some(self.services.scheduler.start_repeating(self.poll_interval));
    }

    /// Cancel the reconciliation timer, if any.
    fn stop_poll(&mut self) {
        if let Some(id) = self.poll.take() {
            self.services.scheduler.cancel(id);
        }
    }

    /// Publish a snapshot when it differs from the last one sent.
    fn publish_if_changed(&mut self) {
        let snap = self.snapshot();
        if self.last_published.as_ref() == Some(&snap) {
            return;
        }
        self.last_published = Some(snap.clone());
        self.notifier.publish(SessionEvent::Changed(snap));
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.clear_cover();
    }
}
