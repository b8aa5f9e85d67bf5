//! Rectangle type and coordinate helpers.
//!
//! The engine's canonical space has its origin at the bottom-left corner of
//! the primary display with Y growing upwards (AppKit global coordinates).
//! Window registries on macOS report top-left origin rectangles, which are
//! converted with [`Rect::flipped`].

/// Axis-aligned rectangle in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Bottom edge in canonical space (top edge in native registry space).
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Construct a rectangle from origin and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// True when both dimensions are at least `min`.
    pub fn at_least(&self, min: f64) -> bool {
        self.width >= min && self.height >= min
    }

    /// Flip between top-left and bottom-left origin using the primary
    /// display height as the reference: `y' = primary_height - y - height`.
    ///
    /// The conversion is its own inverse.
    pub fn flipped(self, primary_height: f64) -> Self {
        Self {
            y: primary_height - self.y - self.height,
            ..self
        }
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        approx_eq_eps(self.x, other.x, eps)
            && approx_eq_eps(self.y, other.y, eps)
            && approx_eq_eps(self.width, other.width, eps)
            && approx_eq_eps(self.height, other.height, eps)
    }
}

/// Compare two floats within an absolute tolerance.
pub fn approx_eq_eps(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_against_primary_height() {
        let native = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(native.flipped(1080.0), Rect::new(0.0, 480.0, 800.0, 600.0));
    }

    #[test]
    fn flip_is_an_involution() {
        let r = Rect::new(-1280.0, 37.5, 640.0, 400.0);
        assert_eq!(r.flipped(900.0).flipped(900.0), r);
    }

    #[test]
    fn flip_above_primary_goes_negative_native() {
        // A window on a display stacked above the primary has negative native Y.
        let r = Rect::new(10.0, -500.0, 300.0, 200.0).flipped(1000.0);
        assert_eq!(r.y, 1300.0);
    }

    #[test]
    fn approx_eq_eps_basic() {
        assert!(approx_eq_eps(1.0, 1.0, 0.0));
        assert!(approx_eq_eps(1.0, 1.000_5, 0.001));
        assert!(!approx_eq_eps(1.0, 1.01, 0.001));
    }

    #[test]
    fn size_threshold_is_inclusive() {
        assert!(Rect::new(0.0, 0.0, 50.0, 50.0).at_least(50.0));
        assert!(!Rect::new(0.0, 0.0, 49.9, 400.0).at_least(50.0));
    }

    #[test]
    fn non_finite_detected() {
        assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_finite());
    }
}
