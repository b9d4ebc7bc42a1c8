//! The drawing-surface capability trait.

use kurbo::{Affine, BezPath, Point, Rect, Size};

use crate::{Color, Error, FontWeight, StrokeStyle};

/// The point size surfaces fall back to before any font is selected.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// A concrete drawing target: vector canvas, raster buffer, SVG
/// document, and so on.
///
/// The [`RenderContext`] adapter computes all derived geometry (text
/// anchoring, the ellipse affine trick, polygon closing) and drives a
/// surface through this minimal set of operations. Surfaces keep a
/// state stack: `save`/`restore` must cover the current transform, clip,
/// font and antialias hint, so that the adapter can guarantee that no
/// drawing operation leaks state into the next one.
///
/// [`RenderContext`]: crate::RenderContext
pub trait Surface {
    /// The decoded, drawable representation of an image.
    type Image;

    /// Push a copy of the current state onto the state stack.
    fn save(&mut self) -> Result<(), Error>;

    /// Pop the state stack; errors with [`Error::StackUnbalance`] if empty.
    fn restore(&mut self) -> Result<(), Error>;

    /// Concatenate `transform` onto the current transform.
    fn transform(&mut self, transform: Affine);

    /// Fill the path interior with a solid color.
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Stroke the path outline.
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, style: &StrokeStyle);

    /// Hint that subsequent strokes prefer sharp (non-antialiased)
    /// rendering. Surfaces without per-call antialias control may
    /// ignore this; it must never fail.
    fn set_antialias(&mut self, _enabled: bool) {}

    /// Intersect the active clip region with `rect`, in current
    /// transform coordinates. Returns whether clipping was applied;
    /// surfaces without clip support return `false` and the caller
    /// degrades gracefully.
    fn clip_rect(&mut self, rect: Rect) -> bool;

    /// Remove all clipping, restoring the full surface as drawable.
    fn reset_clip(&mut self);

    /// Select the font used by [`text_extent`] and [`fill_text`].
    ///
    /// [`text_extent`]: Surface::text_extent
    /// [`fill_text`]: Surface::fill_text
    fn set_font(&mut self, family: &str, size: f64, weight: FontWeight);

    /// Measure the extent of `text` in the current font.
    fn text_extent(&mut self, text: &str) -> Size;

    /// Draw `text` with its baseline starting at `origin`, in the
    /// current font and transform.
    fn fill_text(&mut self, text: &str, origin: Point, color: Color);

    /// Decode encoded image bytes into this surface's drawable
    /// representation. Malformed input is an error; it propagates to the
    /// draw call that triggered the decode.
    fn decode_image(&mut self, data: &[u8]) -> Result<Self::Image, Error>;

    /// The intrinsic pixel size of a decoded image.
    fn image_size(&self, image: &Self::Image) -> Size;

    /// Blit `image` at its intrinsic size with the top-left corner at
    /// the origin of the current transform. `opacity` below 1.0 must
    /// reduce coverage; `interpolate` selects smooth versus
    /// nearest-neighbor resampling where the surface supports it.
    fn draw_image(&mut self, image: &Self::Image, opacity: f64, interpolate: bool);
}

/// Surfaces are owned externally; this lets a context bind one without
/// taking ownership.
impl<S: Surface + ?Sized> Surface for &mut S {
    type Image = S::Image;

    fn save(&mut self) -> Result<(), Error> {
        (**self).save()
    }

    fn restore(&mut self) -> Result<(), Error> {
        (**self).restore()
    }

    fn transform(&mut self, transform: Affine) {
        (**self).transform(transform)
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        (**self).fill_path(path, color)
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, style: &StrokeStyle) {
        (**self).stroke_path(path, color, width, style)
    }

    fn set_antialias(&mut self, enabled: bool) {
        (**self).set_antialias(enabled)
    }

    fn clip_rect(&mut self, rect: Rect) -> bool {
        (**self).clip_rect(rect)
    }

    fn reset_clip(&mut self) {
        (**self).reset_clip()
    }

    fn set_font(&mut self, family: &str, size: f64, weight: FontWeight) {
        (**self).set_font(family, size, weight)
    }

    fn text_extent(&mut self, text: &str) -> Size {
        (**self).text_extent(text)
    }

    fn fill_text(&mut self, text: &str, origin: Point, color: Color) {
        (**self).fill_text(text, origin, color)
    }

    fn decode_image(&mut self, data: &[u8]) -> Result<Self::Image, Error> {
        (**self).decode_image(data)
    }

    fn image_size(&self, image: &Self::Image) -> Size {
        (**self).image_size(image)
    }

    fn draw_image(&mut self, image: &Self::Image, opacity: f64, interpolate: bool) {
        (**self).draw_image(image, opacity, interpolate)
    }
}
