use blinders_engine::{AppIcon, AppIdentity, SessionSnapshot};
use image::{Rgba, RgbaImage};
use tracing::{debug, error, warn};
use tray_icon::{
    Icon, TrayIcon, TrayIconBuilder,
    menu::{
        Icon as MenuIcon, IconMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu,
    },
};

use crate::status;

/// Edge length of the generated tray icon, in pixels.
const TRAY_ICON_PX: u32 = 36;

/// Tray icon: four horizontal slats, drawn as a template image so macOS tints
/// it for Light and Dark modes.
fn tray_icon_image() -> Option<Icon> {
    let slat = TRAY_ICON_PX / 8;
    let img = RgbaImage::from_fn(TRAY_ICON_PX, TRAY_ICON_PX, |x, y| {
        let margin = x < slat || x >= TRAY_ICON_PX - slat;
        let on = !margin && (y / slat) % 2 == 1;
        Rgba([0, 0, 0, if on { 255 } else { 0 }])
    });
    let (w, h) = img.dimensions();
    Icon::from_rgba(img.into_raw(), w, h).ok()
}

/// Decode an application icon for a menu entry.
fn menu_icon(icon: &AppIcon) -> Option<MenuIcon> {
    match image::load_from_memory(icon.bytes()) {
        Ok(im) => {
            let rgba = im.to_rgba8();
            let (w, h) = rgba.dimensions();
            MenuIcon::from_rgba(rgba.into_raw(), w, h).ok()
        }
        Err(e) => {
            debug!(error = %e, "app icon decode failed");
            None
        }
    }
}

/// A menu command, resolved from a menu event id.
#[derive(Debug, Clone)]
pub enum TrayAction {
    /// Pick the focus target.
    Select(AppIdentity),
    /// Re-list running applications.
    Refresh,
    /// Start a session on the selection.
    Start,
    /// End the session.
    Stop,
    /// Return to the target.
    Back,
    /// Open the Screen Recording settings pane.
    OpenSettings,
    /// Exit the app.
    Quit,
}

/// Tray icon and its menu.
pub struct Tray {
    /// Keeps the status item alive.
    icon: TrayIcon,
    /// Disabled first line describing the session.
    status: MenuItem,
    /// "Focus On" submenu.
    focus_on: Submenu,
    /// Current submenu entries.
    app_items: Vec<(IconMenuItem, AppIdentity)>,
    /// Placeholder shown when no applications are listed.
    empty: MenuItem,
    /// Whether `empty` is currently in the submenu.
    empty_shown: bool,
    /// "Refresh Apps".
    refresh: MenuItem,
    /// "Start Focus".
    start: MenuItem,
    /// "Stop Focus".
    stop: MenuItem,
    /// "Back to Focus".
    back: MenuItem,
    /// "Screen Recording Settings…".
    settings: MenuItem,
    /// "Quit Blinders".
    quit: MenuItem,
    /// Selection the submenu labels reflect.
    selected: Option<AppIdentity>,
}

impl Tray {
    /// Build the tray icon. Must run on the main thread once the event loop
    /// is running. Returns `None` if the status item cannot be created.
    pub fn new() -> Option<Self> {
        let menu = Menu::new();
        let status = MenuItem::new(
            status::status_line(&SessionSnapshot::default()),
            false,
            None,
        );
        let focus_on = Submenu::new("Focus On", true);
        let empty = MenuItem::new("No applications", false, None);
        let refresh = MenuItem::new("Refresh Apps", true, None);
        let start = MenuItem::new("Start Focus", false, None);
        let stop = MenuItem::new("Stop Focus", false, None);
        let back = MenuItem::new("Back to Focus", false, None);
        let settings = MenuItem::new("Screen Recording Settings…", true, None);
        let quit = MenuItem::new("Quit Blinders", true, None);

        let sep = PredefinedMenuItem::separator;
        let appended = [
            menu.append(&status),
            menu.append(&sep()),
            menu.append(&focus_on),
            menu.append(&refresh),
            menu.append(&sep()),
            menu.append(&start),
            menu.append(&stop),
            menu.append(&back),
            menu.append(&sep()),
            menu.append(&settings),
            menu.append(&quit),
        ];
        if let Some(Err(e)) = appended.into_iter().find(Result::is_err) {
            warn!("tray menu append failed: {}", e);
        }

        let mut builder = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("Blinders");
        if let Some(icon) = tray_icon_image() {
            builder = builder.with_icon(icon).with_icon_as_template(true);
        }
        let icon = match builder.build() {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to create tray icon: {}", e);
                return None;
            }
        };
        Some(Self {
            icon,
            status,
            focus_on,
            app_items: Vec::new(),
            empty,
            empty_shown: false,
            refresh,
            start,
            stop,
            back,
            settings,
            quit,
            selected: None,
        })
    }

    /// Replace the "Focus On" entries.
    pub fn set_apps(&mut self, apps: Vec<AppIdentity>) {
        for (item, _) in self.app_items.drain(..) {
            if let Err(e) = self.focus_on.remove(&item) {
                debug!("remove menu item failed: {}", e);
            }
        }
        if apps.is_empty() != self.empty_shown {
            let res = if apps.is_empty() {
                self.focus_on.append(&self.empty)
            } else {
                self.focus_on.remove(&self.empty)
            };
            if let Err(e) = res {
                debug!("placeholder update failed: {}", e);
            }
            self.empty_shown = apps.is_empty();
        }
        for app in apps {
            let label = status::app_label(&app, self.selected.as_ref());
            let icon = app.icon.as_ref().and_then(menu_icon);
            let item = IconMenuItem::new(label, true, icon, None);
            if let Err(e) = self.focus_on.append(&item) {
                warn!("append app item failed: {}", e);
                continue;
            }
            self.app_items.push((item, app));
        }
        debug!(count = self.app_items.len(), "tray_apps_listed");
    }

    /// Reflect a session snapshot in the menu.
    pub fn apply(&mut self, snap: &SessionSnapshot) {
        self.status.set_text(status::status_line(snap));
        let en = status::enabled(snap);
        self.start.set_enabled(en.start);
        self.stop.set_enabled(en.stop);
        self.back.set_enabled(en.back);
        if let Err(e) = self.icon.set_tooltip(Some(status::tooltip(snap))) {
            debug!("set tooltip failed: {}", e);
        }
        if self.selected != snap.selected {
            self.selected = snap.selected.clone();
            for (item, app) in &self.app_items {
                item.set_text(status::app_label(app, self.selected.as_ref()));
            }
        }
    }

    /// Map a menu event id to a command.
    pub fn action(&self, id: &MenuId) -> Option<TrayAction> {
        let fixed = [
            (&self.refresh, TrayAction::Refresh),
            (&self.start, TrayAction::Start),
            (&self.stop, TrayAction::Stop),
            (&self.back, TrayAction::Back),
            (&self.settings, TrayAction::OpenSettings),
            (&self.quit, TrayAction::Quit),
        ];
        if let Some((_, action)) = fixed.into_iter().find(|(item, _)| item.id() == id) {
            return Some(action);
        }
        self.app_items
            .iter()
            .find(|(item, _)| item.id() == id)
            .map(|(_, app)| TrayAction::Select(app.clone()))
    }
}
