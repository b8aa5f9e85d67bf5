//! Cover overlay windows.
//!
//! Each overlay is a borderless, opaque window above every normal and
//! floating window, present on all Spaces (including full-screen ones). It
//! shows a headline, a subtitle, a scatter of glyphs and a button that invokes
//! a caller-supplied action.

use objc2::{
    DefinedClass, MainThreadOnly, define_class, msg_send,
    rc::Retained,
    runtime::{AnyObject, NSObject, NSObjectProtocol},
    sel,
};
use objc2_app_kit::{
    NSAutoresizingMaskOptions, NSBackingStoreType, NSButton, NSColor, NSFont,
    NSScreenSaverWindowLevel, NSTextAlignment, NSTextField, NSView, NSWindow,
    NSWindowCollectionBehavior, NSWindowStyleMask,
};
use objc2_foundation::{MainThreadMarker, NSPoint, NSRect, NSSize, NSString};
use tracing::trace;

use crate::{
    error::{Error, Result},
    geom::Frame,
};

/// Visual content of an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayAppearance {
    /// Large centred message.
    pub headline: String,
    /// Line under the headline.
    pub subtitle: String,
    /// Button label.
    pub button: String,
    /// Decorative glyph scattered over the background; empty for none.
    pub glyph: String,
    /// Grid spacing of the glyph scatter, in points.
    pub glyph_spacing: f64,
    /// Background colour as sRGB components.
    pub background: (f64, f64, f64, f64),
}

const HEADLINE_SIZE: f64 = 64.0;
const SUBTITLE_SIZE: f64 = 28.0;
const GLYPH_SIZE: f64 = 40.0;
const BUTTON_SIZE: (f64, f64) = (220.0, 44.0);
/// Largest jitter applied to each glyph, in points per axis.
const GLYPH_JITTER: f64 = 20.0;
/// Upper bound on glyph labels per overlay.
const MAX_GLYPHS: usize = 600;

/// Action-target ivars: the callback run when the button is pressed.
struct ReturnTargetIvars {
    /// Invoked on the main thread.
    action: Box<dyn Fn()>,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "BlindersReturnTarget"]
    #[ivars = ReturnTargetIvars]
    struct ReturnTarget;

    unsafe impl NSObjectProtocol for ReturnTarget {}

    impl ReturnTarget {
        #[unsafe(method(returnToFocus:))]
        fn return_to_focus(&self, _sender: Option<&AnyObject>) {
            trace!("overlay_return_pressed");
            (self.ivars().action)();
        }
    }
);

impl ReturnTarget {
    fn new(mtm: MainThreadMarker, action: Box<dyn Fn()>) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(ReturnTargetIvars { action });
        unsafe { msg_send![super(this), init] }
    }
}

/// A live cover window. Closed on drop.
pub struct OverlayWindow {
    window: Retained<NSWindow>,
    // NSControl targets are weak; the overlay keeps its own alive.
    _target: Retained<ReturnTarget>,
}

impl OverlayWindow {
    /// Create and show an overlay covering `frame` (AppKit coordinates).
    ///
    /// Requires AppKit main thread.
    pub fn show(
        frame: Frame,
        appearance: &OverlayAppearance,
        on_return: Box<dyn Fn()>,
    ) -> Result<Self> {
        let mtm = MainThreadMarker::new().ok_or(Error::MainThread)?;
        if !(frame.width > 0.0 && frame.height > 0.0) {
            return Err(Error::OverlayCreate(format!("empty frame {frame:?}")));
        }
        let window = unsafe {
            NSWindow::initWithContentRect_styleMask_backing_defer(
                mtm.alloc(),
                frame.to_ns(),
                NSWindowStyleMask::Borderless,
                NSBackingStoreType::Buffered,
                false,
            )
        };
        let (r, g, b, a) = appearance.background;
        unsafe {
            window.setReleasedWhenClosed(false);
            window.setLevel(NSScreenSaverWindowLevel);
            window.setCollectionBehavior(
                NSWindowCollectionBehavior::CanJoinAllSpaces
                    | NSWindowCollectionBehavior::FullScreenAuxiliary
                    | NSWindowCollectionBehavior::Stationary,
            );
            window.setOpaque(true);
            window.setHasShadow(false);
            window.setIgnoresMouseEvents(false);
            let bg = NSColor::colorWithSRGBRed_green_blue_alpha(r, g, b, a);
            window.setBackgroundColor(Some(&bg));
        }

        let target = ReturnTarget::new(mtm, on_return);
        let content = window
            .contentView()
            .ok_or_else(|| Error::OverlayCreate("window has no content view".into()))?;
        populate(mtm, &content, frame, appearance, &target);

        window.orderFrontRegardless();
        trace!(?frame, "overlay_show");
        Ok(Self {
            window,
            _target: target,
        })
    }

    /// Move or resize in place.
    pub fn set_frame(&self, frame: Frame) {
        trace!(?frame, "overlay_set_frame");
        self.window.setFrame_display(frame.to_ns(), true);
    }
}

impl Drop for OverlayWindow {
    fn drop(&mut self) {
        self.window.orderOut(None);
        self.window.close();
    }
}

/// Build the overlay's subviews.
fn populate(
    mtm: MainThreadMarker,
    content: &NSView,
    frame: Frame,
    appearance: &OverlayAppearance,
    target: &ReturnTarget,
) {
    let (w, h) = (frame.width, frame.height);

    if !appearance.glyph.is_empty() {
        let glyph = NSString::from_str(&appearance.glyph);
        let font = NSFont::systemFontOfSize(GLYPH_SIZE);
        for (x, y) in glyph_positions(w, h, appearance.glyph_spacing) {
            let label = NSTextField::labelWithString(&glyph, mtm);
            label.setFont(Some(&font));
            label.setFrame(rect(x, y, GLYPH_SIZE * 1.4, GLYPH_SIZE * 1.4));
            content.addSubview(&label);
        }
    }

    let centred = NSAutoresizingMaskOptions::ViewMinXMargin
        | NSAutoresizingMaskOptions::ViewMaxXMargin
        | NSAutoresizingMaskOptions::ViewMinYMargin
        | NSAutoresizingMaskOptions::ViewMaxYMargin;
    let white = NSColor::whiteColor();

    let headline = NSTextField::labelWithString(&NSString::from_str(&appearance.headline), mtm);
    headline.setFont(Some(&NSFont::boldSystemFontOfSize(HEADLINE_SIZE)));
    headline.setTextColor(Some(&white));
    headline.setAlignment(NSTextAlignment::Center);
    headline.setFrame(rect(0.0, h / 2.0 + 30.0, w, HEADLINE_SIZE * 1.3));
    headline.setAutoresizingMask(NSAutoresizingMaskOptions::ViewWidthSizable | centred);
    content.addSubview(&headline);

    let subtitle = NSTextField::labelWithString(&NSString::from_str(&appearance.subtitle), mtm);
    subtitle.setFont(Some(&NSFont::systemFontOfSize(SUBTITLE_SIZE)));
    subtitle.setTextColor(Some(&white));
    subtitle.setAlignment(NSTextAlignment::Center);
    subtitle.setFrame(rect(0.0, h / 2.0 - 20.0, w, SUBTITLE_SIZE * 1.4));
    subtitle.setAutoresizingMask(NSAutoresizingMaskOptions::ViewWidthSizable | centred);
    content.addSubview(&subtitle);

    let target_obj: &AnyObject = target;
    let button = unsafe {
        NSButton::buttonWithTitle_target_action(
            &NSString::from_str(&appearance.button),
            Some(target_obj),
            Some(sel!(returnToFocus:)),
            mtm,
        )
    };
    let (bw, bh) = BUTTON_SIZE;
    button.setFrame(rect((w - bw) / 2.0, h / 2.0 - 100.0, bw, bh));
    button.setAutoresizingMask(centred);
    content.addSubview(&button);
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> NSRect {
    NSRect::new(NSPoint::new(x, y), NSSize::new(w, h))
}

/// Grid of glyph origins covering a `width` x `height` view, each nudged by a
/// deterministic jitter of up to [`GLYPH_JITTER`] points per axis.
pub fn glyph_positions(width: f64, height: f64, spacing: f64) -> Vec<(f64, f64)> {
    let spacing = spacing.max(8.0);
    let mut out = Vec::new();
    let mut row = 0u32;
    let mut y = 0.0;
    while y < height && out.len() < MAX_GLYPHS {
        let mut col = 0u32;
        let mut x = 0.0;
        while x < width && out.len() < MAX_GLYPHS {
            let (dx, dy) = jitter(row, col);
            out.push((x + dx, y + dy));
            x += spacing;
            col += 1;
        }
        y += spacing;
        row += 1;
    }
    out
}

/// Cheap hash of a grid cell mapped to `[-GLYPH_JITTER, GLYPH_JITTER]` per axis.
fn jitter(row: u32, col: u32) -> (f64, f64) {
    let mut v = (u64::from(row) << 32 | u64::from(col)).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    v ^= v >> 29;
    let unit = |bits: u64| (bits & 0xFFFF) as f64 / f64::from(0xFFFF_u32) * 2.0 - 1.0;
    (unit(v) * GLYPH_JITTER, unit(v >> 16) * GLYPH_JITTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_cover_the_view() {
        let pts = glyph_positions(800.0, 600.0, 80.0);
        assert_eq!(pts.len(), 10 * 8);
        for (x, y) in &pts {
            assert!((-GLYPH_JITTER..=800.0 + GLYPH_JITTER).contains(x));
            assert!((-GLYPH_JITTER..=600.0 + GLYPH_JITTER).contains(y));
        }
    }

    #[test]
    fn glyphs_are_bounded_and_deterministic() {
        let a = glyph_positions(10_000.0, 10_000.0, 10.0);
        assert_eq!(a.len(), MAX_GLYPHS);
        assert_eq!(a, glyph_positions(10_000.0, 10_000.0, 10.0));
    }

    #[test]
    fn tiny_spacing_is_clamped() {
        assert_eq!(glyph_positions(80.0, 80.0, 0.0).len(), 100);
    }
}
