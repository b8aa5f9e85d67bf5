use blinders_engine::{
    CoverMode, RawWindow, Rect, Screen, SessionEvent, SessionState,
    test_support::{TestRig, browser, terminal},
};

fn two_screens(rig: &TestRig) {
    rig.displays.set_screens(vec![
        Screen {
            id: 1,
            frame: Rect::new(0.0, 0.0, 1920.0, 1080.0),
        },
        Screen {
            id: 2,
            frame: Rect::new(1920.0, 0.0, 2560.0, 1440.0),
        },
    ]);
}

#[test]
fn no_windows_falls_back_to_every_display() {
    let mut rig = TestRig::new();
    two_screens(&rig);
    rig.start_on_editor();
    rig.engine.on_activation(&browser());

    assert_eq!(rig.engine.state(), SessionState::Distracted);
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(2));
    assert_eq!(
        rig.overlays.live(),
        vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 2560.0, 1440.0),
        ]
    );
    assert!(rig.engine.covered_windows().is_empty());
    assert!(!rig.engine.is_polling());
    assert!(rig.engine.next_deadline().is_none());
}

#[test]
fn helper_and_non_normal_windows_do_not_count() {
    let mut rig = TestRig::new();
    rig.registry
        .add_window(200, 11, Rect::new(0.0, 0.0, 40.0, 40.0));
    rig.registry.add_raw(RawWindow {
        id: 12,
        owner_pid: 200,
        layer: 25,
        bounds: Rect::new(0.0, 0.0, 800.0, 24.0),
    });
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(1));
}

#[test]
fn unreadable_registry_falls_back() {
    let mut rig = TestRig::new();
    rig.registry
        .add_window(200, 11, Rect::new(0.0, 0.0, 800.0, 600.0));
    rig.registry.set_unreadable(true);
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(1));
    assert!(!rig.engine.is_polling());
}

#[test]
fn denied_capability_skips_window_queries() {
    let mut rig = TestRig::new();
    rig.probe.set_allowed(false);
    rig.registry
        .add_window(200, 11, Rect::new(0.0, 0.0, 800.0, 600.0));
    rig.start_on_editor();
    rig.engine.on_activation(&browser());

    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(1));
    assert!(!rig.engine.is_polling());
    assert_eq!(rig.registry.queries(), 0);
}

#[test]
fn denied_capability_is_reported_once() {
    let mut rig = TestRig::new();
    rig.probe.set_allowed(false);
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    rig.engine.on_activation(&terminal());

    let denied = rig
        .drain_events()
        .into_iter()
        .filter(|e| *e == SessionEvent::CapabilityDenied)
        .count();
    assert_eq!(denied, 1);
}

#[test]
fn capability_is_rechecked_on_each_distraction() {
    let mut rig = TestRig::new();
    rig.probe.set_allowed(false);
    rig.registry
        .add_window(300, 21, Rect::new(0.0, 0.0, 800.0, 600.0));
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(1));

    rig.probe.set_allowed(true);
    rig.engine.on_activation(&terminal());
    assert_eq!(rig.engine.cover_mode(), CoverMode::Windows(1));
    assert_eq!(rig.overlays.live_count(), 1);
}

#[test]
fn no_displays_covers_nothing() {
    let mut rig = TestRig::new();
    rig.displays.set_screens(Vec::new());
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    assert_eq!(rig.engine.state(), SessionState::Distracted);
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(0));
    assert_eq!(rig.overlays.live_count(), 0);
    assert!(!rig.engine.is_polling());
}

#[test]
fn overlay_failures_never_panic_or_poll() {
    let mut rig = TestRig::new();
    rig.registry
        .add_window(200, 11, Rect::new(0.0, 0.0, 800.0, 600.0));
    rig.overlays.set_fail_create(true);
    rig.start_on_editor();
    rig.engine.on_activation(&browser());

    assert_eq!(rig.engine.state(), SessionState::Distracted);
    assert_eq!(rig.engine.cover_mode(), CoverMode::FullScreen(0));
    assert!(!rig.engine.is_polling());

    rig.engine.return_to_target();
    assert_eq!(rig.engine.state(), SessionState::OnTarget);
}

#[test]
fn windows_are_flipped_against_primary_height() {
    let mut rig = TestRig::new();
    rig.registry
        .add_window(200, 11, Rect::new(100.0, 200.0, 300.0, 400.0));
    // A window on a display above the primary one has a negative native Y.
    rig.registry
        .add_window(200, 12, Rect::new(0.0, -900.0, 500.0, 500.0));
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    assert_eq!(
        rig.engine.covered_windows(),
        vec![
            (11, Rect::new(100.0, 480.0, 300.0, 400.0)),
            (12, Rect::new(0.0, 1480.0, 500.0, 500.0)),
        ]
    );
}

#[test]
fn full_screen_cover_is_replaced_on_return() {
    let mut rig = TestRig::new();
    two_screens(&rig);
    rig.start_on_editor();
    rig.engine.on_activation(&browser());
    assert_eq!(rig.overlays.live_count(), 2);

    rig.engine.on_activation(&blinders_engine::test_support::editor());
    assert_eq!(rig.overlays.live_count(), 0);
    assert_eq!(rig.overlays.destroyed(), 2);
    assert_eq!(rig.engine.cover_mode(), CoverMode::None);
}
