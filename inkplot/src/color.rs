//! A simple representation of color.

use std::fmt;

/// A 32-bit RGBA color.
///
/// Alpha carries drawing semantics beyond blending: a color whose alpha
/// is zero is *invisible*, and every drawing operation treats an
/// invisible fill or stroke as "do not draw" rather than as a zero-alpha
/// draw call. See [`Color::is_visible`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// Fully transparent; the canonical "no fill" / "no stroke" value.
    pub const TRANSPARENT: Color = Color(0);
    pub const BLACK: Color = Color::rgb8(0, 0, 0);
    pub const WHITE: Color = Color::rgb8(0xff, 0xff, 0xff);

    /// Create a color from a 32-bit rgba value (alpha as least significant byte).
    pub const fn rgba32(rgba: u32) -> Color {
        Color(rgba)
    }

    /// Create an opaque color from three 8-bit components.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Color {
        Color::rgba8(r, g, b, 0xff)
    }

    /// Create a color from four 8-bit components.
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    /// Change just the alpha value, `a` in the range 0.0 to 1.0.
    pub fn with_alpha(self, a: f64) -> Color {
        let a = (a.clamp(0.0, 1.0) * 255.0).round() as u32;
        Color((self.0 & !0xff) | a)
    }

    /// The color as a 32-bit rgba value.
    pub const fn as_rgba32(self) -> u32 {
        self.0
    }

    /// The four 8-bit components, in (r, g, b, a) order.
    pub const fn as_rgba8(self) -> (u8, u8, u8, u8) {
        (
            (self.0 >> 24) as u8,
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8,
        )
    }

    /// Alpha in the range 0.0 to 1.0.
    pub fn alpha(self) -> f64 {
        (self.0 & 0xff) as f64 / 255.0
    }

    /// Whether drawing with this color has any effect.
    ///
    /// Operations skip the fill or stroke pass entirely when the
    /// corresponding color is invisible.
    pub const fn is_visible(self) -> bool {
        self.0 & 0xff != 0
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}
