use blinders_engine::{AppIdentity, SessionSnapshot, SessionState};

/// Which menu commands are currently meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enabled {
    /// "Start Focus": a target is selected and no session runs.
    pub start: bool,
    /// "Stop Focus": a session runs.
    pub stop: bool,
    /// "Back to Focus": the user is distracted.
    pub back: bool,
}

/// One-line summary shown at the top of the tray menu.
pub fn status_line(snap: &SessionSnapshot) -> String {
    let name = |app: &Option<AppIdentity>| {
        app.as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "?".to_string())
    };
    match snap.state {
        SessionState::Inactive => match &snap.selected {
            Some(app) => format!("Ready to focus on {}", app.name),
            None => "Select an app to focus on".to_string(),
        },
        SessionState::OnTarget => format!("Focusing on {}. Stay focused!", name(&snap.target)),
        SessionState::Distracted => format!(
            "You're distracted by {}! Back to {}",
            name(&snap.distracting),
            name(&snap.target)
        ),
    }
}

/// Tooltip for the tray icon.
pub fn tooltip(snap: &SessionSnapshot) -> String {
    match (&snap.state, &snap.target) {
        (SessionState::Inactive, _) | (_, None) => "Blinders".to_string(),
        (_, Some(t)) => format!("Blinders: {}", t.name),
    }
}

/// Enabled state of the session commands for `snap`.
pub fn enabled(snap: &SessionSnapshot) -> Enabled {
    let active = snap.state.is_active();
    Enabled {
        start: !active && snap.selected.is_some(),
        stop: active,
        back: snap.state == SessionState::Distracted,
    }
}

/// Label of an application entry in the "Focus On" submenu.
pub fn app_label(app: &AppIdentity, selected: Option<&AppIdentity>) -> String {
    if selected == Some(app) {
        format!("✓ {}", app.name)
    } else {
        app.name.clone()
    }
}
