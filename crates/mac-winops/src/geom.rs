use objc2_foundation::{NSPoint, NSRect, NSSize};

/// Rectangle in points. Registry rows use the native top-left origin;
/// screens and overlays use AppKit's bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Left edge.
    pub x: f64,
    /// Top edge (native) or bottom edge (AppKit).
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Frame {
    /// Construct from origin and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub(crate) fn to_ns(self) -> NSRect {
        NSRect::new(
            NSPoint::new(self.x, self.y),
            NSSize::new(self.width, self.height),
        )
    }

    pub(crate) fn from_ns(r: NSRect) -> Self {
        Self::new(r.origin.x, r.origin.y, r.size.width, r.size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ns_round_trip() {
        let f = Frame::new(-1440.0, 25.0, 800.0, 600.0);
        assert_eq!(Frame::from_ns(f.to_ns()), f);
    }
}
