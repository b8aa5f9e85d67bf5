//! Pure reconciliation of covered windows against a fresh snapshot.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    geom::Rect,
    snapshot::{TrackedWindow, WindowId},
};

/// Changes needed to make the overlay set match a fresh window list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    /// Covered windows that have gone away.
    pub remove: Vec<WindowId>,
    /// Newly visible windows that need an overlay.
    pub add: Vec<TrackedWindow>,
    /// Covered windows whose frame changed beyond the tolerance.
    pub moved: Vec<(WindowId, Rect)>,
}

impl Plan {
    /// True when nothing needs to change.
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty() && self.moved.is_empty()
    }
}

/// Compute the plan taking `current` (window id to covered frame) to `fresh`.
///
/// Duplicate ids in `fresh` are resolved first-wins. Frames equal within `eps`
/// are left alone.
pub fn plan(current: &BTreeMap<WindowId, Rect>, fresh: &[TrackedWindow], eps: f64) -> Plan {
    let mut out = Plan::default();
    let mut seen = BTreeSet::new();
    for w in fresh {
        if !seen.insert(w.id) {
            continue;
        }
        match current.get(&w.id) {
            Some(frame) if frame.approx_eq(&w.frame, eps) => {}
            Some(_) => out.moved.push((w.id, w.frame)),
            None => out.add.push(*w),
        }
    }
    out.remove = current
        .keys()
        .filter(|id| !seen.contains(*id))
        .copied()
        .collect();
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tw(id: WindowId, x: f64) -> TrackedWindow {
        TrackedWindow {
            id,
            frame: Rect::new(x, 0.0, 100.0, 100.0),
            owner_pid: 1,
        }
    }

    #[test]
    fn close_and_open() {
        let current: BTreeMap<_, _> = [(1, tw(1, 0.0).frame), (2, tw(2, 0.0).frame)].into();
        let p = plan(&current, &[tw(2, 0.0), tw(3, 0.0)], 0.5);
        assert_eq!(p.remove, vec![1]);
        assert_eq!(p.add, vec![tw(3, 0.0)]);
        assert!(p.moved.is_empty());
    }

    #[test]
    fn sub_epsilon_jitter_is_ignored() {
        let current: BTreeMap<_, _> = [(1, tw(1, 0.0).frame)].into();
        assert!(plan(&current, &[tw(1, 0.3)], 0.5).is_empty());
        let p = plan(&current, &[tw(1, 12.0)], 0.5);
        assert_eq!(p.moved, vec![(1, tw(1, 12.0).frame)]);
    }

    #[test]
    fn duplicates_first_wins() {
        let p = plan(&BTreeMap::new(), &[tw(4, 1.0), tw(4, 9.0)], 0.5);
        assert_eq!(p.add, vec![tw(4, 1.0)]);
    }

    proptest! {
        #[test]
        fn applying_plan_yields_fresh_set(
            current_ids in proptest::collection::btree_set(1u32..40, 0..12),
            fresh in proptest::collection::vec((1u32..40, -500.0f64..500.0), 0..12),
        ) {
            let current: BTreeMap<_, _> = current_ids
                .iter()
                .map(|id| (*id, Rect::new(0.0, 0.0, 100.0, 100.0)))
                .collect();
            let fresh: Vec<_> = fresh.into_iter().map(|(id, x)| tw(id, x)).collect();
            let p = plan(&current, &fresh, 0.5);

            let mut applied = current.clone();
            for id in &p.remove {
                prop_assert!(applied.remove(id).is_some());
            }
            for (id, frame) in &p.moved {
                prop_assert!(applied.insert(*id, *frame).is_some());
            }
            for w in &p.add {
                prop_assert!(applied.insert(w.id, w.frame).is_none());
            }

            let want: BTreeSet<_> = fresh.iter().map(|w| w.id).collect();
            let got: BTreeSet<_> = applied.keys().copied().collect();
            prop_assert_eq!(got, want);

            // Every surviving overlay sits within tolerance of the first
            // fresh frame for its id.
            for (id, frame) in &applied {
                let first = fresh.iter().find(|w| w.id == *id).map(|w| w.frame);
                prop_assert!(first.is_some_and(|f| f.approx_eq(frame, 0.5)));
            }
        }
    }
}
