use std::{collections::HashSet, time::Duration};

use blinders_engine::{
    CoverMode, Rect, SessionState, SnapshotProvider, TimerId, WindowId, WindowSource,
    test_support::{TestRig, browser, editor, terminal},
};
use proptest::prelude::*;

fn frame(x: f64) -> Rect {
    Rect::new(x, 0.0, 800.0, 600.0)
}

/// Rig distracted by Browser with windows 1 and 2 covered.
fn distracted_with_two() -> TestRig {
    let mut rig = TestRig::new();
    rig.registry.add_window(200, 1, frame(0.0));
    rig.registry.add_window(200, 2, frame(100.0));
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    assert_eq!(rig.engine.cover_mode(), CoverMode::Windows(2));
    rig.overlays.clear_calls();
    rig
}

fn ids(list: &[WindowId]) -> HashSet<WindowId> {
    list.iter().copied().collect()
}

#[test]
fn closed_and_opened_windows_are_reconciled() {
    let mut rig = distracted_with_two();
    rig.registry.remove_window(1);
    rig.registry.add_window(200, 3, frame(200.0));

    assert!(rig.tick());
    assert_eq!(rig.covered_ids(), ids(&[2, 3]));
    assert_eq!(rig.overlays.live_count(), 2);
    assert_eq!(rig.overlays.destroyed(), 1);
    assert_eq!(rig.overlays.created(), 1);
    assert_eq!(rig.overlays.updated(), 0);
}

#[test]
fn moves_update_in_place() {
    let mut rig = distracted_with_two();
    rig.registry.move_window(1, Rect::new(50.0, 10.0, 900.0, 700.0));

    assert!(rig.tick());
    assert_eq!(rig.overlays.updated(), 1);
    assert_eq!(rig.overlays.created(), 0);
    assert_eq!(rig.overlays.destroyed(), 0);
    assert_eq!(
        rig.engine.covered_windows()[0],
        (1, Rect::new(50.0, 370.0, 900.0, 700.0))
    );
    assert!(
        rig.overlays
            .live()
            .contains(&Rect::new(50.0, 370.0, 900.0, 700.0))
    );
}

#[test]
fn sub_pixel_jitter_is_ignored() {
    let mut rig = distracted_with_two();
    rig.registry
        .move_window(1, Rect::new(0.2, 0.0, 800.0, 600.3));
    assert!(rig.tick());
    assert!(rig.overlays.calls().is_empty());
}

#[test]
fn helper_windows_appearing_are_not_covered() {
    let mut rig = distracted_with_two();
    rig.registry
        .add_window(200, 9, Rect::new(0.0, 0.0, 20.0, 20.0));
    assert!(rig.tick());
    assert_eq!(rig.covered_ids(), ids(&[1, 2]));
}

#[test]
fn losing_the_last_window_falls_back() {
    let mut rig = distracted_with_two();
    rig.registry.clear_pid(200);

    assert!(rig.tick());
    assert_eq!(rig.engine.state(), SessionState::Distracted);
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(1));
    assert_eq!(rig.overlays.live(), vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)]);
    assert!(!rig.engine.is_polling());
    assert!(!rig.tick());

    // A new window does not bring back window tracking; the cover stays.
    rig.registry.add_window(200, 5, frame(0.0));
    assert!(!rig.tick());
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(1));
}

#[test]
fn late_wakeup_reconciles_once() {
    let mut rig = distracted_with_two();
    rig.registry.remove_window(2);
    let deadline = rig.engine.next_deadline().expect("poll scheduled");
    rig.engine.run_due(deadline + Duration::from_secs(3));
    assert_eq!(rig.covered_ids(), ids(&[1]));
    let next = rig.engine.next_deadline().expect("still polling");
    assert!(next > deadline + Duration::from_secs(3));
}

#[test]
fn leaving_distracted_stops_the_poll() {
    let mut rig = distracted_with_two();
    let deadline = rig.engine.next_deadline().expect("poll scheduled");
    rig.engine.on_activation(&editor());
    assert!(rig.engine.next_deadline().is_none());

    rig.registry.add_window(200, 3, frame(0.0));
    rig.engine.run_due(deadline + Duration::from_secs(1));
    assert_eq!(rig.overlays.live_count(), 0);
    assert_eq!(rig.overlays.created(), 0);
}

#[test]
fn stale_timer_ticks_are_discarded() {
    let mut rig = distracted_with_two();
    rig.engine.on_activation(&editor());
    rig.registry.add_window(300, 31, frame(0.0));
    rig.engine.on_activation(&terminal());
    assert_eq!(rig.covered_ids(), ids(&[31]));

    rig.registry.add_window(300, 32, frame(300.0));
    // Timer 1 belonged to the Browser cover and was cancelled.
    rig.engine.on_poll_tick(TimerId(1));
    assert_eq!(rig.covered_ids(), ids(&[31]));
    assert!(rig.engine.is_polling());

    assert!(rig.tick());
    assert_eq!(rig.covered_ids(), ids(&[31, 32]));
}

#[test]
fn window_ids_track_snapshot_through_a_script() {
    let mut rig = distracted_with_two();
    let snapshot = SnapshotProvider::new(rig.registry.clone(), 50.0);
    let check = |rig: &TestRig| {
        let want: HashSet<_> = snapshot.list_windows(200).iter().map(|w| w.id).collect();
        assert_eq!(rig.covered_ids(), want);
        assert_eq!(rig.overlays.live_count(), want.len());
        assert_eq!(
            rig.engine.state() == SessionState::Distracted,
            rig.engine.distracting().is_some()
        );
    };

    rig.registry.add_window(200, 3, frame(10.0));
    rig.tick();
    check(&rig);
    rig.registry.move_window(2, frame(400.0));
    rig.registry.remove_window(3);
    rig.tick();
    check(&rig);
    rig.registry.add_window(200, 4, frame(20.0));
    rig.registry.add_window(200, 5, frame(30.0));
    rig.registry.remove_window(1);
    rig.tick();
    check(&rig);
}

#[derive(Clone, Debug)]
enum Op {
    Open(WindowId, f64, f64),
    Close(WindowId),
    Move(WindowId, f64),
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..8, 10.0f64..900.0, 10.0f64..900.0).prop_map(|(id, w, h)| Op::Open(id, w, h)),
        (1u32..8).prop_map(Op::Close),
        (1u32..8, -400.0f64..400.0).prop_map(|(id, x)| Op::Move(id, x)),
        Just(Op::Tick),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn covered_set_matches_last_snapshot(ops in proptest::collection::vec(op(), 1..40)) {
        let mut rig = TestRig::new();
        rig.registry.add_window(200, 1, frame(0.0));
        rig.start_on_editor();
        rig.engine.on_activation(&browser());
        let snapshot = SnapshotProvider::new(rig.registry.clone(), 50.0);
        let mut fell_back = false;

        for op in ops.into_iter().chain([Op::Tick]) {
            match op {
                Op::Open(id, w, h) => {
                    rig.registry.remove_window(id);
                    rig.registry.add_window(200, id, Rect::new(0.0, 0.0, w, h));
                }
                Op::Close(id) => rig.registry.remove_window(id),
                Op::Move(id, x) => {
                    if let Some(f) = snapshot.window_frame(id) {
                        rig.registry.move_window(id, Rect::new(x, 1080.0 - f.y - f.height, f.width, f.height));
                    }
                }
                Op::Tick => {
                    rig.tick();
                    match rig.engine.cover_mode() {
                        CoverMode::Windows(n) => {
                            prop_assert!(!fell_back);
                            let fresh = snapshot.list_windows(200);
                            let want: HashSet<_> = fresh.iter().map(|w| w.id).collect();
                            prop_assert_eq!(rig.covered_ids(), want);
                            prop_assert_eq!(n, fresh.len());
                            prop_assert_eq!(rig.overlays.live_count(), n);
                            for (id, covered) in rig.engine.covered_windows() {
                                let live = fresh.iter().find(|w| w.id == id).map(|w| w.frame);
                                prop_assert!(live.is_some_and(|f| f.approx_eq(&covered, 0.5)));
                            }
                        }
                        CoverMode::FullScreen(n) => {
                            fell_back = true;
                            prop_assert_eq!(n, 1);
                            prop_assert!(!rig.engine.is_polling());
                        }
                        CoverMode::None => prop_assert!(false, "distracted without cover"),
                    }
                    prop_assert_eq!(rig.engine.state(), SessionState::Distracted);
                }
            }
        }
    }
}
