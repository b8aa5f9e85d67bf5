//! Event types emitted by the focus watcher.

use std::fmt;

/// The foreground application changed.
///
/// `bundle_id` and `name` are absent for processes that do not report them
/// (command-line tools, some helpers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEvent {
    /// Process id of the newly active application.
    pub pid: i32,
    /// Bundle identifier, when known.
    pub bundle_id: Option<String>,
    /// Localized display name, when known.
    pub name: Option<String>,
}

impl ActivationEvent {
    /// Best human-readable label: name, then bundle id, then the pid.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.bundle_id.clone())
            .unwrap_or_else(|| format!("pid {}", self.pid))
    }
}

impl fmt::Display for ActivationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back() {
        let mut ev = ActivationEvent {
            pid: 42,
            bundle_id: Some("com.example.app".into()),
            name: Some("App".into()),
        };
        assert_eq!(ev.to_string(), "App (42)");
        ev.name = None;
        assert_eq!(ev.label(), "com.example.app");
        ev.bundle_id = None;
        assert_eq!(ev.label(), "pid 42");
    }
}
