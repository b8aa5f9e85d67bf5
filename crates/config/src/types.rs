use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, defaults::*};

/// Linear RGBA colour, each component in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub f64, pub f64, pub f64, pub f64);

impl Rgba {
    fn components(self) -> [f64; 4] {
        [self.0, self.1, self.2, self.3]
    }
}

/// Timing and filtering parameters for the focus session engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Reconciliation poll period while covering individual windows.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Windows narrower or shorter than this (points) are ignored as helpers.
    #[serde(default = "default_min_window_size")]
    pub min_window_size: f64,
    /// Frame changes at or below this distance (points) do not move an overlay.
    #[serde(default = "default_frame_epsilon")]
    pub frame_epsilon: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            min_window_size: MIN_WINDOW_SIZE,
            frame_epsilon: FRAME_EPSILON,
        }
    }
}

impl EngineSettings {
    /// Poll period as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Appearance of the cover overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayStyle {
    /// Large centred message.
    #[serde(default = "default_headline")]
    pub headline: String,
    /// Smaller line under the headline.
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    /// Label of the return-to-focus button.
    #[serde(default = "default_button")]
    pub button: String,
    /// Decorative glyph scattered across the overlay. Empty disables the scatter.
    #[serde(default = "default_glyph")]
    pub glyph: String,
    /// Grid spacing of the glyph scatter in points.
    #[serde(default = "default_glyph_spacing")]
    pub glyph_spacing: f64,
    /// Overlay background colour.
    #[serde(default = "default_background")]
    pub background: Rgba,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            headline: default_headline(),
            subtitle: default_subtitle(),
            button: default_button(),
            glyph: default_glyph(),
            glyph_spacing: GLYPH_SPACING,
            background: BACKGROUND,
        }
    }
}

/// Permission prompt behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionSettings {
    /// Show a one-time prompt when Screen Recording permission is missing.
    #[serde(default = "default_true")]
    pub prompt_screen_recording: bool,
}

impl Default for PermissionSettings {
    fn default() -> Self {
        Self {
            prompt_screen_recording: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Engine timing and window filtering.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Overlay appearance.
    #[serde(default)]
    pub overlay: OverlayStyle,
    /// Permission prompts.
    #[serde(default)]
    pub permissions: PermissionSettings,
}

impl Config {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        let e = &self.engine;
        if !(POLL_INTERVAL_MIN_MS..=POLL_INTERVAL_MAX_MS).contains(&e.poll_interval_ms) {
            return Err(invalid(
                "engine.poll_interval_ms",
                format!(
                    "must be between {} and {}, got {}",
                    POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS, e.poll_interval_ms
                ),
            ));
        }
        if !e.min_window_size.is_finite() || e.min_window_size < 0.0 {
            return Err(invalid(
                "engine.min_window_size",
                format!("must be a non-negative number, got {}", e.min_window_size),
            ));
        }
        if !e.frame_epsilon.is_finite() || e.frame_epsilon < 0.0 {
            return Err(invalid(
                "engine.frame_epsilon",
                format!("must be a non-negative number, got {}", e.frame_epsilon),
            ));
        }
        let o = &self.overlay;
        if !o.glyph_spacing.is_finite() || o.glyph_spacing < 8.0 {
            return Err(invalid(
                "overlay.glyph_spacing",
                format!("must be at least 8, got {}", o.glyph_spacing),
            ));
        }
        if o
            .background
            .components()
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(invalid(
                "overlay.background",
                format!("components must be within 0..=1, got {:?}", o.background),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: String) -> Error {
    Error::Validation {
        path: None,
        field,
        message,
    }
}
