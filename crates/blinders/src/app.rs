use std::time::Instant;

use blinders_engine::{Engine, SessionEvent};
use mac_focus_watcher::{ActivationEvent, WatcherGuard};
use parking_lot::Mutex;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
    platform::macos::{ActivationPolicy, EventLoopExtMacOS},
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, trace, warn};
use tray_icon::menu::{MenuEvent, MenuId};

use crate::{
    platform, prompt,
    tray::{Tray, TrayAction},
};

/// Messages posted into the event loop from callbacks.
#[derive(Debug)]
pub enum UserEvent {
    /// The foreground application changed.
    Activated(ActivationEvent),
    /// A tray menu item was chosen.
    Menu(MenuId),
    /// An overlay's return button was pressed.
    ReturnRequested,
}

/// Main-thread application state.
struct App {
    /// Session engine.
    engine: Engine,
    /// Session events for the tray.
    events: UnboundedReceiver<SessionEvent>,
    /// Status item; absent until the loop starts or if creation failed.
    tray: Option<Tray>,
    /// Activation observer registration.
    watcher: Option<WatcherGuard>,
    /// Show the Screen Recording alert at launch when the permission is missing.
    prompt_screen_recording: bool,
    /// Set by the Quit command.
    quit: bool,
}

impl App {
    /// One-time setup once the event loop is running.
    fn start(&mut self, proxy: &EventLoopProxy<UserEvent>) {
        self.tray = Tray::new();
        self.refresh_apps();

        let proxy = proxy.clone();
        match mac_focus_watcher::install(move |ev| {
            if proxy.send_event(UserEvent::Activated(ev)).is_err() {
                trace!("event loop closed; activation dropped");
            }
        }) {
            Ok(guard) => self.watcher = Some(guard),
            Err(e) => error!("Failed to install activation observer: {}", e),
        }

        let perms = permissions::check_permissions();
        info!(?perms, "permissions");
        if !perms.screen_recording_ok && self.prompt_screen_recording {
            prompt::screen_recording_alert();
        }
    }

    /// Re-list running applications into the tray.
    fn refresh_apps(&mut self) {
        let apps = self.engine.running_applications();
        if let Some(tray) = &mut self.tray {
            tray.set_apps(apps);
        }
    }

    /// Dispatch a posted event.
    fn handle(&mut self, ev: UserEvent) {
        match ev {
            UserEvent::Activated(ev) => {
                trace!(app = %ev, "activated");
                self.engine.on_activation(&platform::identity(&ev));
            }
            UserEvent::Menu(id) => {
                let action = self.tray.as_ref().and_then(|t| t.action(&id));
                match action {
                    Some(action) => self.on_menu(action),
                    None => debug!(?id, "unknown menu id"),
                }
            }
            UserEvent::ReturnRequested => self.engine.return_to_target(),
        }
    }

    /// Run a tray command.
    fn on_menu(&mut self, action: TrayAction) {
        debug!(?action, "menu");
        match action {
            TrayAction::Select(app) => self.engine.select_target(app),
            TrayAction::Refresh => self.refresh_apps(),
            TrayAction::Start => {
                if !self.engine.start_session() {
                    warn!("selected application is no longer running");
                    self.refresh_apps();
                }
            }
            TrayAction::Stop => self.engine.stop_session(),
            TrayAction::Back => self.engine.return_to_target(),
            TrayAction::OpenSettings => {
                if let Err(e) = permissions::open_screen_recording_settings() {
                    warn!("failed to open System Settings: {}", e);
                }
            }
            TrayAction::Quit => {
                self.engine.shutdown();
                self.quit = true;
            }
        }
    }

    /// Forward pending session events to the tray.
    fn drain_events(&mut self) {
        while let Ok(ev) = self.events.try_recv() {
            match ev {
                SessionEvent::Changed(snap) => {
                    if let Some(tray) = &mut self.tray {
                        tray.apply(&snap);
                    }
                }
                SessionEvent::CapabilityDenied => {
                    warn!("window geometry unavailable; covering whole screens");
                }
            }
        }
    }
}

/// Run the menu bar app on the current (main) thread. Never returns.
pub fn run(cfg: config::Config) -> ! {
    let mut event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    event_loop.set_activation_policy(ActivationPolicy::Accessory);
    let proxy = event_loop.create_proxy();

    // Menu events arrive on whichever thread muda uses; hop to the loop.
    let menu_proxy = Mutex::new(proxy.clone());
    MenuEvent::set_event_handler(Some(move |ev: MenuEvent| {
        if menu_proxy.lock().send_event(UserEvent::Menu(ev.id)).is_err() {
            trace!("event loop closed; menu event dropped");
        }
    }));

    let mut engine = Engine::new(platform::services(&cfg, proxy.clone()), &cfg.engine);
    let events = engine.subscribe();
    let mut app = App {
        engine,
        events,
        tray: None,
        watcher: None,
        prompt_screen_recording: cfg.permissions.prompt_screen_recording,
        quit: false,
    };

    info!("blinders started");
    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::NewEvents(StartCause::Init) => app.start(&proxy),
            Event::UserEvent(ev) => app.handle(ev),
            Event::LoopDestroyed => {
                app.engine.shutdown();
                app.watcher = None;
                app.tray = None;
                info!("blinders exiting");
                return;
            }
            _ => {}
        }

        app.engine.run_due(Instant::now());
        app.drain_events();

        *control_flow = if app.quit {
            ControlFlow::Exit
        } else {
            match app.engine.next_deadline() {
                Some(when) => ControlFlow::WaitUntil(when),
                None => ControlFlow::Wait,
            }
        };
    })
}
