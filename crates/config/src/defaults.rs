// Defaults and constants for configuration

use crate::Rgba;

// Engine defaults
pub(crate) const POLL_INTERVAL_MS: u64 = 100;
pub(crate) const POLL_INTERVAL_MIN_MS: u64 = 10;
pub(crate) const POLL_INTERVAL_MAX_MS: u64 = 5000;
pub(crate) const MIN_WINDOW_SIZE: f64 = 50.0;
pub(crate) const FRAME_EPSILON: f64 = 0.5;

// Overlay defaults
pub(crate) const HEADLINE: &str = "GET BACK TO WORK!";
pub(crate) const SUBTITLE: &str = "You got distracted!";
pub(crate) const BUTTON: &str = "Back to Focus";
pub(crate) const GLYPH: &str = "\u{1f4a9}";
pub(crate) const BACKGROUND: Rgba = Rgba(0.45, 0.30, 0.15, 0.97);
pub(crate) const GLYPH_SPACING: f64 = 80.0;

// Serde default functions
pub(crate) const fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL_MS
}
pub(crate) const fn default_min_window_size() -> f64 {
    MIN_WINDOW_SIZE
}
pub(crate) const fn default_frame_epsilon() -> f64 {
    FRAME_EPSILON
}
pub(crate) fn default_headline() -> String {
    HEADLINE.to_string()
}
pub(crate) fn default_subtitle() -> String {
    SUBTITLE.to_string()
}
pub(crate) fn default_button() -> String {
    BUTTON.to_string()
}
pub(crate) fn default_glyph() -> String {
    GLYPH.to_string()
}
pub(crate) const fn default_background() -> Rgba {
    BACKGROUND
}
pub(crate) const fn default_glyph_spacing() -> f64 {
    GLYPH_SPACING
}
pub(crate) const fn default_true() -> bool {
    true
}
