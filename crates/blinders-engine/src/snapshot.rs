//! Window snapshot provider.
//!
//! Turns raw window registry rows into the tracked windows of one process, in
//! canonical coordinates, with helper and non-normal-layer windows removed.

use std::collections::HashSet;

use tracing::trace;

use crate::{deps::WindowSource, geom::Rect, session::Pid};

/// Opaque OS window identifier, stable for the window's lifetime.
pub type WindowId = u32;

/// A visible window of the distracting process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedWindow {
    /// Registry id.
    pub id: WindowId,
    /// Frame in canonical (bottom-left origin) space.
    pub frame: Rect,
    /// Owning process.
    pub owner_pid: Pid,
}

/// One row of the OS window registry, in native top-left coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawWindow {
    /// Registry id.
    pub id: WindowId,
    /// Owning process.
    pub owner_pid: Pid,
    /// Composited window layer; `0` is the normal application layer.
    pub layer: i32,
    /// Native bounds (top-left origin).
    pub bounds: Rect,
}

/// Source of raw window registry rows.
pub trait WindowRegistry {
    /// On-screen, non-desktop windows in front-to-back order. `None` when the
    /// registry cannot be read.
    fn raw_windows(&self) -> Option<Vec<RawWindow>>;

    /// Height of the primary display, used as the Y flip reference.
    fn primary_screen_height(&self) -> Option<f64>;
}

impl<T: WindowRegistry + ?Sized> WindowRegistry for Box<T> {
    fn raw_windows(&self) -> Option<Vec<RawWindow>> {
        (**self).raw_windows()
    }

    fn primary_screen_height(&self) -> Option<f64> {
        (**self).primary_screen_height()
    }
}

/// Normal application window layer.
pub const NORMAL_LAYER: i32 = 0;

/// Filters a [`WindowRegistry`] into per-process tracked windows.
pub struct SnapshotProvider<R> {
    registry: R,
    min_size: f64,
}

impl<R: WindowRegistry> SnapshotProvider<R> {
    /// Wrap a registry, dropping windows smaller than `min_size` in either
    /// dimension.
    pub fn new(registry: R, min_size: f64) -> Self {
        Self { registry, min_size }
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Rows that pass basic sanity checks, deduplicated by id (first wins).
    fn sane_rows(&self) -> Vec<RawWindow> {
        let rows = self.registry.raw_windows().unwrap_or_default();
        let mut seen = HashSet::new();
        rows.into_iter()
            .filter(|w| {
                let ok = w.id > 0 && w.bounds.is_finite();
                if !ok {
                    trace!(id = w.id, pid = w.owner_pid, "snapshot_skip_malformed");
                }
                ok
            })
            .filter(|w| seen.insert(w.id))
            .collect()
    }

    fn to_canonical(&self, bounds: Rect) -> Rect {
        match self.registry.primary_screen_height() {
            Some(h) if h.is_finite() => bounds.flipped(h),
            _ => bounds,
        }
    }
}

impl<R: WindowRegistry> WindowSource for SnapshotProvider<R> {
    fn list_windows(&self, pid: Pid) -> Vec<TrackedWindow> {
        self.sane_rows()
            .into_iter()
            .filter(|w| {
                w.owner_pid == pid && w.layer == NORMAL_LAYER && w.bounds.at_least(self.min_size)
            })
            .map(|w| TrackedWindow {
                id: w.id,
                frame: self.to_canonical(w.bounds),
                owner_pid: w.owner_pid,
            })
            .collect()
    }

    fn window_frame(&self, id: WindowId) -> Option<Rect> {
        self.sane_rows()
            .into_iter()
            .find(|w| w.id == id)
            .map(|w| self.to_canonical(w.bounds))
    }

    fn window_exists(&self, id: WindowId) -> bool {
        self.sane_rows().iter().any(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Rows {
        rows: Option<Vec<RawWindow>>,
        height: Option<f64>,
        queries: Cell<usize>,
    }

    impl WindowRegistry for Rows {
        fn raw_windows(&self) -> Option<Vec<RawWindow>> {
            self.queries.set(self.queries.get() + 1);
            self.rows.clone()
        }

        fn primary_screen_height(&self) -> Option<f64> {
            self.height
        }
    }

    fn row(id: WindowId, pid: Pid, layer: i32, w: f64, h: f64) -> RawWindow {
        RawWindow {
            id,
            owner_pid: pid,
            layer,
            bounds: Rect::new(0.0, 0.0, w, h),
        }
    }

    fn provider(rows: Option<Vec<RawWindow>>, height: Option<f64>) -> SnapshotProvider<Rows> {
        SnapshotProvider::new(
            Rows {
                rows,
                height,
                queries: Cell::new(0),
            },
            50.0,
        )
    }

    #[test]
    fn filters_pid_layer_and_size() {
        let p = provider(
            Some(vec![
                row(1, 200, 0, 800.0, 600.0),
                row(2, 200, 25, 800.0, 600.0),
                row(3, 200, 0, 40.0, 600.0),
                row(4, 300, 0, 800.0, 600.0),
                row(5, 200, 0, 50.0, 50.0),
            ]),
            Some(1080.0),
        );
        let ids: Vec<_> = p.list_windows(200).iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn frames_are_flipped() {
        let p = provider(Some(vec![row(1, 200, 0, 800.0, 600.0)]), Some(1080.0));
        let w = p.list_windows(200);
        assert_eq!(w[0].frame, Rect::new(0.0, 480.0, 800.0, 600.0));
        assert_eq!(p.window_frame(1), Some(Rect::new(0.0, 480.0, 800.0, 600.0)));
    }

    #[test]
    fn unknown_primary_height_passes_through() {
        let p = provider(Some(vec![row(1, 200, 0, 800.0, 600.0)]), None);
        assert_eq!(p.list_windows(200)[0].frame, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn denied_registry_is_empty() {
        let p = provider(None, Some(1080.0));
        assert!(p.list_windows(200).is_empty());
        assert!(!p.window_exists(1));
        assert_eq!(p.window_frame(1), None);
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let mut nan = row(7, 200, 0, 800.0, 600.0);
        nan.bounds.x = f64::NAN;
        let p = provider(
            Some(vec![
                row(0, 200, 0, 800.0, 600.0),
                nan,
                row(9, 200, 0, 800.0, 600.0),
                RawWindow {
                    bounds: Rect::new(5.0, 5.0, 100.0, 100.0),
                    ..row(9, 200, 0, 0.0, 0.0)
                },
            ]),
            None,
        );
        let w = p.list_windows(200);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].frame, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn point_queries_hit_the_registry_each_time() {
        let p = provider(Some(vec![row(1, 200, 0, 800.0, 600.0)]), None);
        assert!(p.window_exists(1));
        assert!(p.window_exists(1));
        assert!(p.window_frame(1).is_some());
        assert_eq!(p.registry().queries.get(), 3);
    }
}
