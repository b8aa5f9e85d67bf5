use crate::{
    deps::{CapabilityProbe, Displays, OverlayHost, Scheduler, WindowSource, Workspace},
    ticker::Ticker,
};

/// Groups the engine's OS collaborators to keep `Engine` fields manageable
/// and make dependencies explicit at construction sites.
pub struct Services {
    /// Window geometry of the distracting process.
    pub windows: Box<dyn WindowSource>,
    /// Overlay surfaces.
    pub overlays: Box<dyn OverlayHost>,
    /// Running applications and activation.
    pub workspace: Box<dyn Workspace>,
    /// Connected displays for fallback covering.
    pub displays: Box<dyn Displays>,
    /// Screen-capture permission probe.
    pub probe: Box<dyn CapabilityProbe>,
    /// Poll timer.
    pub scheduler: Box<dyn Scheduler>,
}

impl Services {
    /// Bundle collaborators with the default wall-clock [`Ticker`].
    pub fn new(
        windows: Box<dyn WindowSource>,
        overlays: Box<dyn OverlayHost>,
        workspace: Box<dyn Workspace>,
        displays: Box<dyn Displays>,
        probe: Box<dyn CapabilityProbe>,
    ) -> Self {
        Self {
            windows,
            overlays,
            workspace,
            displays,
            probe,
            scheduler: Box::new(Ticker::new()),
        }
    }
}
