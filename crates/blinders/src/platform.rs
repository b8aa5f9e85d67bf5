use std::collections::BTreeMap;

use blinders_engine::{
    AppIcon, AppIdentity, CapabilityProbe, Displays, Error as EngineError, OverlayHost, OverlayId,
    OwnProcess, Pid, RawWindow, Rect, Screen, Services, SnapshotProvider, WindowRegistry,
    Workspace,
};
use mac_focus_watcher::ActivationEvent;
use mac_winops::{Frame, OverlayAppearance, OverlayWindow};
use tao::event_loop::EventLoopProxy;
use tracing::{debug, warn};

use crate::app::UserEvent;

/// AppKit frame to engine rect.
fn to_rect(f: Frame) -> Rect {
    Rect::new(f.x, f.y, f.width, f.height)
}

/// Engine rect to AppKit frame.
fn to_frame(r: Rect) -> Frame {
    Frame::new(r.x, r.y, r.width, r.height)
}

/// Engine identity for an activation notification.
pub fn identity(ev: &ActivationEvent) -> AppIdentity {
    AppIdentity {
        pid: ev.pid,
        bundle_id: ev.bundle_id.clone(),
        name: ev.name.clone().unwrap_or_default(),
        icon: None,
    }
}

/// CoreGraphics window list.
struct CgRegistry;

impl WindowRegistry for CgRegistry {
    fn raw_windows(&self) -> Option<Vec<RawWindow>> {
        let rows = mac_winops::on_screen_windows()?;
        Some(
            rows.into_iter()
                .map(|w| RawWindow {
                    id: w.id,
                    owner_pid: w.pid,
                    layer: w.layer,
                    bounds: to_rect(w.bounds),
                })
                .collect(),
        )
    }

    fn primary_screen_height(&self) -> Option<f64> {
        mac_winops::primary_height()
    }
}

/// AppKit overlay windows. AppKit's global coordinate space has a bottom-left
/// origin on the primary display, so engine rects pass through unchanged.
struct AppKitOverlays {
    /// Live overlays by handle.
    windows: BTreeMap<OverlayId, OverlayWindow>,
    /// Next handle to issue.
    next_id: u64,
    /// Content shared by every overlay.
    appearance: OverlayAppearance,
    /// Posts the return request from overlay buttons.
    proxy: EventLoopProxy<UserEvent>,
}

impl OverlayHost for AppKitOverlays {
    fn create(&mut self, frame: Rect) -> blinders_engine::Result<OverlayId> {
        let proxy = self.proxy.clone();
        // Posted rather than handled inline: handling destroys the overlay
        // whose button is still dispatching.
        let on_return = Box::new(move || {
            if proxy.send_event(UserEvent::ReturnRequested).is_err() {
                warn!("event loop gone; return request dropped");
            }
        });
        let window = OverlayWindow::show(to_frame(frame), &self.appearance, on_return)
            .map_err(|e| EngineError::Overlay(e.to_string()))?;
        self.next_id += 1;
        let id = OverlayId(self.next_id);
        self.windows.insert(id, window);
        Ok(id)
    }

    fn update_frame(&mut self, id: OverlayId, frame: Rect) {
        if let Some(w) = self.windows.get(&id) {
            w.set_frame(to_frame(frame));
        }
    }

    fn destroy(&mut self, id: OverlayId) {
        // OverlayWindow closes on drop.
        self.windows.remove(&id);
    }
}

/// NSWorkspace applications and activation.
struct NsWorkspace {
    /// Cached at startup.
    own: OwnProcess,
}

impl Workspace for NsWorkspace {
    fn running_applications(&self) -> Vec<AppIdentity> {
        mac_winops::running_applications()
            .into_iter()
            .map(|a| AppIdentity {
                pid: a.pid,
                bundle_id: a.bundle_id,
                name: a.name.unwrap_or_default(),
                icon: a.icon_tiff.map(AppIcon::new),
            })
            .collect()
    }

    fn activate(&mut self, pid: Pid) -> bool {
        match mac_winops::activate_pid(pid) {
            Ok(()) => true,
            Err(e) => {
                debug!(pid, error = %e, "activate failed");
                false
            }
        }
    }

    fn own_process(&self) -> OwnProcess {
        self.own.clone()
    }
}

/// NSScreen displays.
struct NsDisplays;

impl Displays for NsDisplays {
    fn screens(&self) -> Vec<Screen> {
        match mac_winops::screens() {
            Ok(list) => list
                .into_iter()
                .map(|s| Screen {
                    id: s.id,
                    frame: to_rect(s.frame),
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "screens unavailable");
                Vec::new()
            }
        }
    }
}

/// Screen Recording permission check.
struct ScreenRecordingProbe;

impl CapabilityProbe for ScreenRecordingProbe {
    fn can_enumerate_windows(&self) -> bool {
        permissions::screen_recording_ok()
    }
}

/// Overlay content from the user's style.
fn appearance(style: &config::OverlayStyle) -> OverlayAppearance {
    let bg = style.background;
    OverlayAppearance {
        headline: style.headline.clone(),
        subtitle: style.subtitle.clone(),
        button: style.button.clone(),
        glyph: style.glyph.clone(),
        glyph_spacing: style.glyph_spacing,
        background: (bg.0, bg.1, bg.2, bg.3),
    }
}

/// Assemble the macOS collaborators for the engine.
pub fn services(cfg: &config::Config, proxy: EventLoopProxy<UserEvent>) -> Services {
    let (pid, bundle_id) = mac_winops::own_process();
    Services::new(
        Box::new(SnapshotProvider::new(CgRegistry, cfg.engine.min_window_size)),
        Box::new(AppKitOverlays {
            windows: BTreeMap::new(),
            next_id: 0,
            appearance: appearance(&cfg.overlay),
            proxy,
        }),
        Box::new(NsWorkspace {
            own: OwnProcess { pid, bundle_id },
        }),
        Box::new(NsDisplays),
        Box::new(ScreenRecordingProbe),
    )
}
