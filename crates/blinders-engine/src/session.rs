//! Session model: application identities, session phases and the snapshot
//! published to observers.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// OS process identifier.
pub type Pid = i32;

/// Encoded application icon (TIFF bytes as provided by AppKit).
#[derive(Clone, PartialEq, Eq)]
pub struct AppIcon(pub Arc<[u8]>);

impl AppIcon {
    /// Wrap encoded image bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Raw encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AppIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppIcon({} bytes)", self.0.len())
    }
}

/// A running application as seen by the engine.
///
/// Identity is the process id alone: two values with the same `pid` compare
/// equal regardless of name or bundle id.
#[derive(Clone, Debug)]
pub struct AppIdentity {
    /// Process id.
    pub pid: Pid,
    /// Bundle identifier, when the process has one.
    pub bundle_id: Option<String>,
    /// Localized display name.
    pub name: String,
    /// Application icon for menus.
    pub icon: Option<AppIcon>,
}

impl AppIdentity {
    /// Identity with a pid and display name only.
    pub fn new(pid: Pid, name: impl Into<String>) -> Self {
        Self {
            pid,
            bundle_id: None,
            name: name.into(),
            icon: None,
        }
    }

    /// Builder: attach a bundle identifier.
    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    /// Builder: attach an icon.
    pub fn with_icon(mut self, icon: AppIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl PartialEq for AppIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for AppIdentity {}

impl Hash for AppIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pid.hash(state);
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.pid)
    }
}

/// Phase of the focus session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session running.
    #[default]
    Inactive,
    /// Session running and the target is (or was last) in front.
    OnTarget,
    /// Session running and another application is in front and covered.
    Distracted,
}

impl SessionState {
    /// True for `OnTarget` and `Distracted`.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

/// Session fields. Mutated only by the engine, through the transitions below,
/// which keep the field invariants:
/// an active state implies a target, and a distracting app is present exactly
/// when the state is `Distracted`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    target: Option<AppIdentity>,
    state: SessionState,
    distracting: Option<AppIdentity>,
}

impl Session {
    /// Current phase.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Focus target, if a session has started.
    pub fn target(&self) -> Option<&AppIdentity> {
        self.target.as_ref()
    }

    /// Application currently being covered.
    pub fn distracting(&self) -> Option<&AppIdentity> {
        self.distracting.as_ref()
    }

    pub(crate) fn begin(&mut self, target: AppIdentity) {
        self.target = Some(target);
        self.state = SessionState::OnTarget;
        self.distracting = None;
    }

    pub(crate) fn back_on_target(&mut self) {
        if self.target.is_some() {
            self.state = SessionState::OnTarget;
            self.distracting = None;
        }
    }

    pub(crate) fn distract(&mut self, app: AppIdentity) {
        if self.target.is_some() {
            self.state = SessionState::Distracted;
            self.distracting = Some(app);
        }
    }

    pub(crate) fn end(&mut self) {
        *self = Self::default();
    }
}

/// What the engine is currently covering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoverMode {
    /// Nothing covered.
    #[default]
    None,
    /// Per-window overlays, with the overlay count.
    Windows(usize),
    /// Full-screen fallback overlays, one per display.
    FullScreen(usize),
}

impl CoverMode {
    /// Number of live overlays.
    pub fn overlay_count(self) -> usize {
        match self {
            Self::None => 0,
            Self::Windows(n) | Self::FullScreen(n) => n,
        }
    }
}

/// Observable copy of the session, published on every change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current phase.
    pub state: SessionState,
    /// Focus target.
    pub target: Option<AppIdentity>,
    /// Covered application.
    pub distracting: Option<AppIdentity>,
    /// Target picked in the menu but not necessarily started.
    pub selected: Option<AppIdentity>,
    /// Covering mode.
    pub cover: CoverMode,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn identity_is_pid_only() {
        let a = AppIdentity::new(10, "Safari").with_bundle_id("com.apple.Safari");
        let b = AppIdentity::new(10, "Renamed");
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn transitions_keep_invariants() {
        let mut s = Session::default();
        // Distracting without a target is refused.
        s.distract(AppIdentity::new(2, "b"));
        assert_eq!(s.state(), SessionState::Inactive);
        assert!(s.distracting().is_none());

        s.begin(AppIdentity::new(1, "a"));
        assert_eq!(s.state(), SessionState::OnTarget);
        s.distract(AppIdentity::new(2, "b"));
        assert_eq!(s.state(), SessionState::Distracted);
        assert_eq!(s.distracting().map(|a| a.pid), Some(2));
        s.back_on_target();
        assert!(s.distracting().is_none());
        s.end();
        assert_eq!(s, Session::default());
    }

    #[test]
    fn icon_debug_is_compact() {
        let icon = AppIcon::new(vec![0u8; 4096]);
        assert_eq!(format!("{icon:?}"), "AppIcon(4096 bytes)");
    }
}
