#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use crate::{Config, Error, Rgba, load_from_path, load_from_str, resolve_and_load, to_ron_string};

    #[test]
    fn empty_text_yields_defaults() {
        let cfg = load_from_str("   \n").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.engine.poll_interval_ms, 100);
        assert_eq!(cfg.engine.min_window_size, 50.0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = load_from_str("(engine: (poll_interval_ms: 250))").unwrap();
        assert_eq!(cfg.engine.poll_interval_ms, 250);
        assert_eq!(cfg.engine.min_window_size, 50.0);
        assert_eq!(cfg.overlay.button, "Back to Focus");
        assert!(cfg.permissions.prompt_screen_recording);
    }

    #[test]
    fn overlay_fields_parse() {
        let cfg = load_from_str(
            r#"(overlay: (headline: "Nope", glyph: "", background: (0.0, 0.0, 0.0, 1.0)))"#,
        )
        .unwrap();
        assert_eq!(cfg.overlay.headline, "Nope");
        assert!(cfg.overlay.glyph.is_empty());
        assert_eq!(cfg.overlay.background, Rgba(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = load_from_str("(engine: (poll_ms: 5))").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    }

    #[test]
    fn out_of_range_poll_interval_is_rejected() {
        let err = load_from_str("(engine: (poll_interval_ms: 1))").unwrap_err();
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "engine.poll_interval_ms"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_colour_is_rejected() {
        let err = load_from_str("(overlay: (background: (2.0, 0.0, 0.0, 1.0)))").unwrap_err();
        assert!(err.pretty().contains("overlay.background"));
    }

    #[test]
    fn dump_round_trips_defaults() {
        let text = to_ron_string(&Config::default()).unwrap();
        assert_eq!(load_from_str(&text).unwrap(), Config::default());
    }

    #[test]
    fn file_errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ron");
        fs::write(&path, "(engine: (poll_interval_ms: \"x\"))").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.pretty().contains("bad.ron"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = resolve_and_load(Some(Path::new("/nonexistent/blinders.ron"))).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
