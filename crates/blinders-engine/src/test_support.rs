//! Test support utilities for blinders-engine integration and unit tests.
//!
//! Fakes for every OS collaborator. Each fake is `Clone` and shares its state
//! behind an `Arc<Mutex<..>>`, so a test keeps one handle for inspection while
//! the engine owns another.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    CapabilityProbe, Displays, Engine, Error, OverlayHost, OverlayId, OwnProcess, Pid, RawWindow,
    Rect, Result, Screen, SessionEvent, SessionSnapshot, SnapshotProvider, WindowId,
    WindowRegistry, Workspace, services::Services, session::AppIdentity,
};

/// Primary display height used by [`TestRig`].
pub const PRIMARY_HEIGHT: f64 = 1080.0;

/// Pid reported for the engine's own process by [`TestRig`].
pub const OWN_PID: Pid = 999;

/// Bundle id reported for the engine's own process by [`TestRig`].
pub const OWN_BUNDLE: &str = "dev.blinders";

// ---- Window registry ----

/// Shared registry rows.
#[derive(Default)]
struct RegistryState {
    rows: Vec<RawWindow>,
    primary_height: Option<f64>,
    unreadable: bool,
    queries: usize,
}

/// In-memory window registry with native (top-left origin) bounds.
#[derive(Clone, Default)]
pub struct FakeRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl FakeRegistry {
    /// Registry whose primary display is `primary_height` points tall.
    pub fn new(primary_height: f64) -> Self {
        let reg = Self::default();
        reg.inner.lock().primary_height = Some(primary_height);
        reg
    }

    /// Add a normal-layer window.
    pub fn add_window(&self, pid: Pid, id: WindowId, bounds: Rect) {
        self.add_raw(RawWindow {
            id,
            owner_pid: pid,
            layer: 0,
            bounds,
        });
    }

    /// Add an arbitrary registry row.
    pub fn add_raw(&self, row: RawWindow) {
        self.inner.lock().rows.push(row);
    }

    /// Change the native bounds of a window.
    pub fn move_window(&self, id: WindowId, bounds: Rect) {
        for row in self.inner.lock().rows.iter_mut().filter(|r| r.id == id) {
            row.bounds = bounds;
        }
    }

    /// Close a window.
    pub fn remove_window(&self, id: WindowId) {
        self.inner.lock().rows.retain(|r| r.id != id);
    }

    /// Close every window of `pid`.
    pub fn clear_pid(&self, pid: Pid) {
        self.inner.lock().rows.retain(|r| r.owner_pid != pid);
    }

    /// Simulate the registry refusing to answer.
    pub fn set_unreadable(&self, unreadable: bool) {
        self.inner.lock().unreadable = unreadable;
    }

    /// Number of registry reads so far.
    pub fn queries(&self) -> usize {
        self.inner.lock().queries
    }
}

impl WindowRegistry for FakeRegistry {
    fn raw_windows(&self) -> Option<Vec<RawWindow>> {
        let mut st = self.inner.lock();
        st.queries += 1;
        if st.unreadable {
            None
        } else {
            Some(st.rows.clone())
        }
    }

    fn primary_screen_height(&self) -> Option<f64> {
        self.inner.lock().primary_height
    }
}

// ---- Overlays ----

/// Overlay host call log entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayCall {
    /// `create` succeeded.
    Create(OverlayId, Rect),
    /// `update_frame`.
    Update(OverlayId, Rect),
    /// `destroy`.
    Destroy(OverlayId),
}

/// Shared overlay bookkeeping.
#[derive(Default)]
struct OverlayState {
    next: u64,
    live: BTreeMap<OverlayId, Rect>,
    calls: Vec<OverlayCall>,
    fail_create: bool,
}

/// Overlay host that records every call.
#[derive(Clone, Default)]
pub struct FakeOverlays {
    inner: Arc<Mutex<OverlayState>>,
}

impl FakeOverlays {
    /// Frames of the live overlays, in creation order.
    pub fn live(&self) -> Vec<Rect> {
        self.inner.lock().live.values().copied().collect()
    }

    /// Number of live overlays.
    pub fn live_count(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Ids of the live overlays.
    pub fn live_ids(&self) -> Vec<OverlayId> {
        self.inner.lock().live.keys().copied().collect()
    }

    /// Full call log.
    pub fn calls(&self) -> Vec<OverlayCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of successful creations.
    pub fn created(&self) -> usize {
        self.count(|c| matches!(c, OverlayCall::Create(..)))
    }

    /// Number of destroys.
    pub fn destroyed(&self) -> usize {
        self.count(|c| matches!(c, OverlayCall::Destroy(..)))
    }

    /// Number of in-place frame updates.
    pub fn updated(&self) -> usize {
        self.count(|c| matches!(c, OverlayCall::Update(..)))
    }

    /// Make subsequent `create` calls fail.
    pub fn set_fail_create(&self, fail: bool) {
        self.inner.lock().fail_create = fail;
    }

    /// Forget the call log, keeping live overlays.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    fn count(&self, pred: impl Fn(&OverlayCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

impl OverlayHost for FakeOverlays {
    fn create(&mut self, frame: Rect) -> Result<OverlayId> {
        let mut st = self.inner.lock();
        if st.fail_create {
            return Err(Error::Overlay("create refused".into()));
        }
        st.next += 1;
        let id = OverlayId(st.next);
        st.live.insert(id, frame);
        st.calls.push(OverlayCall::Create(id, frame));
        Ok(id)
    }

    fn update_frame(&mut self, id: OverlayId, frame: Rect) {
        let mut st = self.inner.lock();
        if let Some(f) = st.live.get_mut(&id) {
            *f = frame;
        }
        st.calls.push(OverlayCall::Update(id, frame));
    }

    fn destroy(&mut self, id: OverlayId) {
        let mut st = self.inner.lock();
        st.live.remove(&id);
        st.calls.push(OverlayCall::Destroy(id));
    }
}

// ---- Workspace ----

/// Shared workspace contents.
#[derive(Default)]
struct WorkspaceState {
    apps: Vec<AppIdentity>,
    activations: Vec<Pid>,
    own: OwnProcess,
}

/// Running applications list with an activation log.
#[derive(Clone, Default)]
pub struct FakeWorkspace {
    inner: Arc<Mutex<WorkspaceState>>,
}

impl FakeWorkspace {
    /// Workspace whose own process is `own`.
    pub fn new(own: OwnProcess) -> Self {
        let ws = Self::default();
        ws.inner.lock().own = own;
        ws
    }

    /// Launch an application.
    pub fn add_app(&self, app: AppIdentity) {
        self.inner.lock().apps.push(app);
    }

    /// Quit an application.
    pub fn remove_app(&self, pid: Pid) {
        self.inner.lock().apps.retain(|a| a.pid != pid);
    }

    /// Pids passed to `activate`, in order.
    pub fn activations(&self) -> Vec<Pid> {
        self.inner.lock().activations.clone()
    }
}

impl Workspace for FakeWorkspace {
    fn running_applications(&self) -> Vec<AppIdentity> {
        self.inner.lock().apps.clone()
    }

    fn activate(&mut self, pid: Pid) -> bool {
        let mut st = self.inner.lock();
        st.activations.push(pid);
        st.apps.iter().any(|a| a.pid == pid)
    }

    fn own_process(&self) -> OwnProcess {
        self.inner.lock().own.clone()
    }
}

// ---- Displays and probe ----

/// Configurable display list.
#[derive(Clone, Default)]
pub struct FakeDisplays {
    inner: Arc<Mutex<Vec<Screen>>>,
}

impl FakeDisplays {
    /// Replace the connected displays.
    pub fn set_screens(&self, screens: Vec<Screen>) {
        *self.inner.lock() = screens;
    }
}

impl Displays for FakeDisplays {
    fn screens(&self) -> Vec<Screen> {
        self.inner.lock().clone()
    }
}

/// Capability probe with a switchable answer.
#[derive(Clone)]
pub struct FakeProbe {
    allowed: Arc<AtomicBool>,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self {
            allowed: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl FakeProbe {
    /// Grant or revoke window enumeration.
    pub fn set_allowed(&self, allowed: bool) {
        self.allowed.store(allowed, Ordering::SeqCst);
    }
}

impl CapabilityProbe for FakeProbe {
    fn can_enumerate_windows(&self) -> bool {
        self.allowed.load(Ordering::SeqCst)
    }
}

// ---- Rig ----

/// An engine wired to fakes, with handles to every fake.
///
/// Defaults: one 1920x1080 display, running apps Editor (100),
/// Browser (200) and Terminal (300), own process pid 999.
pub struct TestRig {
    /// Engine under test.
    pub engine: Engine,
    /// Window registry.
    pub registry: FakeRegistry,
    /// Overlay host.
    pub overlays: FakeOverlays,
    /// Workspace.
    pub workspace: FakeWorkspace,
    /// Displays.
    pub displays: FakeDisplays,
    /// Capability probe.
    pub probe: FakeProbe,
    /// Subscription opened at construction.
    pub events: UnboundedReceiver<SessionEvent>,
}

impl Default for TestRig {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRig {
    /// Rig with default settings.
    pub fn new() -> Self {
        Self::with_settings(&config::EngineSettings::default())
    }

    /// Rig with explicit engine settings.
    pub fn with_settings(settings: &config::EngineSettings) -> Self {
        let registry = FakeRegistry::new(PRIMARY_HEIGHT);
        let overlays = FakeOverlays::default();
        let workspace = FakeWorkspace::new(OwnProcess {
            pid: OWN_PID,
            bundle_id: Some(OWN_BUNDLE.into()),
        });
        for app in [editor(), browser(), terminal()] {
            workspace.add_app(app);
        }
        let displays = FakeDisplays::default();
        displays.set_screens(vec![Screen {
            id: 1,
            frame: Rect::new(0.0, 0.0, 1920.0, PRIMARY_HEIGHT),
        }]);
        let probe = FakeProbe::default();

        let services = Services::new(
            Box::new(SnapshotProvider::new(
                registry.clone(),
                settings.min_window_size,
            )),
            Box::new(overlays.clone()),
            Box::new(workspace.clone()),
            Box::new(displays.clone()),
            Box::new(probe.clone()),
        );
        let mut engine = Engine::new(services, settings);
        let events = engine.subscribe();
        Self {
            engine,
            registry,
            overlays,
            workspace,
            displays,
            probe,
            events,
        }
    }

    /// Start a session on Editor and forget the events it produced.
    pub fn start_on_editor(&mut self) {
        assert!(self.engine.start_session_with(&editor()));
        self.drain_events();
    }

    /// Fire the next due timer, if any. Returns whether one was pending.
    pub fn tick(&mut self) -> bool {
        match self.engine.next_deadline() {
            Some(deadline) => {
                self.engine.run_due(deadline);
                true
            }
            None => false,
        }
    }

    /// All events received so far.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }

    /// Only the snapshots among received events.
    pub fn drain_snapshots(&mut self) -> Vec<SessionSnapshot> {
        self.drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Changed(s) => Some(s),
                SessionEvent::CapabilityDenied => None,
            })
            .collect()
    }

    /// Window ids currently covered.
    pub fn covered_ids(&self) -> HashSet<WindowId> {
        self.engine
            .covered_windows()
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }
}

/// The "Editor" application, pid 100.
pub fn editor() -> AppIdentity {
    AppIdentity::new(100, "Editor").with_bundle_id("com.example.editor")
}

/// The "Browser" application, pid 200.
pub fn browser() -> AppIdentity {
    AppIdentity::new(200, "Browser").with_bundle_id("com.example.browser")
}

/// The "Terminal" application, pid 300.
pub fn terminal() -> AppIdentity {
    AppIdentity::new(300, "terminal")
}
