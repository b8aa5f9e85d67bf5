use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info};

use crate::session::SessionSnapshot;

/// Messages published by the engine to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session fields or covering mode changed.
    Changed(SessionSnapshot),
    /// Window geometry is unavailable; covering will use full-screen
    /// fallback. Sent at most once per process.
    CapabilityDenied,
}

/// Fans session events out to subscribed UI channels.
#[derive(Default)]
pub struct Notifier {
    subscribers: Vec<UnboundedSender<SessionEvent>>,
}

impl Notifier {
    /// Create a dispatcher with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Register a new subscriber whose channel starts with `initial`. Other
    /// subscribers do not see it.
    pub fn subscribe_with(&mut self, initial: SessionEvent) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = unbounded_channel();
        if tx.send(initial).is_ok() {
            self.subscribers.push(tx);
        }
        rx
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Send an event to every subscriber, pruning closed channels.
    pub fn publish(&mut self, event: SessionEvent) {
        if let SessionEvent::Changed(snap) = &event {
            debug!(state = ?snap.state, cover = ?snap.cover, "session_changed");
        } else {
            info!(event = ?event, "session_notice");
        }
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            debug!(pruned, "notifier_pruned_closed_subscribers");
        }
    }
}
