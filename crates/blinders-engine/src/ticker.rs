//! Ticker for scheduling repeated actions with deterministic cancellation.
//!
//! Timers are plain deadlines: nothing runs on its own. The host asks for
//! [`Scheduler::next_deadline`], sleeps until then, and hands the current
//! instant to [`Scheduler::take_due`]. Tests do the same with synthetic
//! instants, so no wall-clock waiting is involved.

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use tracing::trace;

use crate::deps::{Scheduler, TimerId};

/// Shortest interval accepted; zero would make a timer permanently due.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// One scheduled timer.
struct TickerEntry {
    /// Repeat period.
    interval: Duration,
    /// Next firing.
    deadline: Instant,
}

/// Deadline-based repeating timer set.
pub struct Ticker {
    /// Scheduled timers.
    entries: BTreeMap<TimerId, TickerEntry>,
    next_id: u64,
    clock: Box<dyn Fn() -> Instant>,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker {
    /// Ticker reading the system monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Instant::now)
    }

    /// Ticker with an injected clock, used to anchor new timers.
    pub fn with_clock(clock: impl Fn() -> Instant + 'static) -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
            clock: Box::new(clock),
        }
    }

    /// Number of scheduled timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Scheduler for Ticker {
    fn start_repeating(&mut self, interval: Duration) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = (self.clock)() + interval;
        trace!(id = id.0, int_ms = interval.as_millis(), "ticker_start");
        self.entries.insert(id, TickerEntry { interval, deadline });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if self.entries.remove(&id).is_some() {
            trace!(id = id.0, "ticker_stop");
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|e| e.deadline).min()
    }

    fn take_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due = Vec::new();
        for (id, entry) in &mut self.entries {
            if entry.deadline > now {
                continue;
            }
            // Skip missed ticks: land on the first multiple of the interval
            // strictly after `now`.
            let behind = now.duration_since(entry.deadline);
            let missed = behind.as_nanos() / entry.interval.as_nanos();
            let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
            entry.deadline += entry.interval.saturating_mul(steps);
            due.push(*id);
        }
        due
    }

    fn is_active(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }
}
