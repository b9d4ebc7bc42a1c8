//! The render context: chart primitives over an injected surface.

use std::collections::{HashMap, HashSet};

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Size, Vec2};

use crate::{
    Color, Error, FontWeight, HorizontalAlignment, ImageSource, LineJoin, StrokeStyle, Surface,
    VerticalAlignment,
};

/// Flattening tolerance for curved shapes, in pre-transform units.
const PATH_TOLERANCE: f64 = 1e-4;

/// Translates device-independent 2D chart primitives into calls against
/// a concrete [`Surface`].
///
/// One context is bound to one surface; rebinding with [`rebind`]
/// replaces the binding while the image cache persists, which is what
/// amortizes decode cost across frames. Every drawing operation saves
/// and restores surface state around its own effect, so no operation
/// leaks transform, clip, font or line style into later calls.
///
/// A context is not safe for concurrent use; confine it to one thread.
///
/// [`rebind`]: RenderContext::rebind
pub struct RenderContext<S: Surface> {
    surface: S,
    images: HashMap<ImageSource, S::Image>,
    in_use: HashSet<ImageSource>,
}

impl<S: Surface> RenderContext<S> {
    /// Bind a new context to `surface`.
    ///
    /// `Surface` is implemented for `&mut S`, so callers that own their
    /// surface elsewhere can bind a mutable borrow instead.
    pub fn new(surface: S) -> RenderContext<S> {
        RenderContext {
            surface,
            images: HashMap::new(),
            in_use: HashSet::new(),
        }
    }

    /// Replace the bound surface, returning the previous one.
    ///
    /// Cached decoded images are kept; they belong to the context, not
    /// to the frame.
    pub fn rebind(&mut self, surface: S) -> S {
        std::mem::replace(&mut self.surface, surface)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Unbind, dropping the cache.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Draws the ellipse inscribed in `rect`.
    ///
    /// A single unit-circle path suffices for arbitrary ellipses: the
    /// surface is translated to the center and scaled by the half axes.
    /// The stroke is drawn under that scale too, so its width is
    /// compensated by `thickness * 2 / width` to come out as `thickness`
    /// device units.
    pub fn draw_ellipse(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<(), Error> {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Ok(());
        }
        let to_ellipse = Affine::translate(rect.center().to_vec2())
            * Affine::scale_non_uniform(rect.width() / 2.0, rect.height() / 2.0);
        let unit_circle = Circle::new(Point::ORIGIN, 1.0).to_path(PATH_TOLERANCE);

        if fill.is_visible() {
            self.surface.save()?;
            self.surface.transform(to_ellipse);
            self.surface.fill_path(&unit_circle, fill);
            self.surface.restore()?;
        }

        if stroke.is_visible() && thickness > 0.0 {
            self.surface.save()?;
            self.surface.transform(to_ellipse);
            self.surface.stroke_path(
                &unit_circle,
                stroke,
                thickness * 2.0 / rect.width(),
                &StrokeStyle::new(),
            );
            self.surface.restore()?;
        }
        Ok(())
    }

    /// Draws an open polyline through `points`, in order.
    ///
    /// Fewer than two points is a no-op, not an error; upstream layout
    /// legitimately produces degenerate geometry. When `aliased` is set,
    /// points are snapped to half-pixel centers and the surface is
    /// hinted to skip antialiasing, which keeps axis-aligned grid lines
    /// sharp.
    pub fn draw_line(
        &mut self,
        points: &[Point],
        stroke: Color,
        thickness: f64,
        dash: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<(), Error> {
        if !stroke.is_visible() || thickness <= 0.0 || points.len() < 2 {
            return Ok(());
        }
        let path = polyline(points, aliased, false);
        let style = pen_style(line_join, dash);

        self.surface.save()?;
        if aliased {
            self.surface.set_antialias(false);
        }
        self.surface.stroke_path(&path, stroke, thickness, &style);
        self.surface.restore()?;
        Ok(())
    }

    /// Draws the closed polygon through `points`.
    ///
    /// The path is closed (last point back to first) before either pass.
    /// Fill and stroke are independent passes, each with its own
    /// save/restore; the fill never sees stroke width or dash.
    pub fn draw_polygon(
        &mut self,
        points: &[Point],
        fill: Color,
        stroke: Color,
        thickness: f64,
        dash: Option<&[f64]>,
        line_join: LineJoin,
        aliased: bool,
    ) -> Result<(), Error> {
        if points.len() < 2 {
            return Ok(());
        }
        let path = polyline(points, aliased, true);

        if fill.is_visible() {
            self.surface.save()?;
            if aliased {
                self.surface.set_antialias(false);
            }
            self.surface.fill_path(&path, fill);
            self.surface.restore()?;
        }

        if stroke.is_visible() && thickness > 0.0 {
            let style = pen_style(line_join, dash);
            self.surface.save()?;
            if aliased {
                self.surface.set_antialias(false);
            }
            self.surface.stroke_path(&path, stroke, thickness, &style);
            self.surface.restore()?;
        }
        Ok(())
    }

    /// Draws an axis-aligned rectangle; fill and stroke passes are
    /// independent as for [`draw_polygon`].
    ///
    /// [`draw_polygon`]: RenderContext::draw_polygon
    pub fn draw_rectangle(
        &mut self,
        rect: Rect,
        fill: Color,
        stroke: Color,
        thickness: f64,
    ) -> Result<(), Error> {
        let path = rect.to_path(PATH_TOLERANCE);

        if fill.is_visible() {
            self.surface.save()?;
            self.surface.fill_path(&path, fill);
            self.surface.restore()?;
        }

        if stroke.is_visible() && thickness > 0.0 {
            self.surface.save()?;
            self.surface
                .stroke_path(&path, stroke, thickness, &StrokeStyle::new());
            self.surface.restore()?;
        }
        Ok(())
    }

    /// Draws `text` anchored at `p`.
    ///
    /// The anchor offset is computed from the measured extent (clamped
    /// to `max_size` for the offset calculation only; glyphs are not
    /// visually truncated). Rotation is applied to the coordinate frame
    /// *before* the alignment offset, so rotated text pivots around the
    /// anchor point rather than around its own center. The baseline is
    /// placed at the measured height below the block's top edge.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        p: Point,
        text: &str,
        fill: Color,
        font_family: &str,
        font_size: f64,
        font_weight: FontWeight,
        rotate: f64,
        halign: HorizontalAlignment,
        valign: VerticalAlignment,
        max_size: Option<Size>,
    ) -> Result<(), Error> {
        if !fill.is_visible() || text.is_empty() {
            return Ok(());
        }
        self.surface.save()?;
        self.surface.set_font(font_family, font_size, font_weight);

        let mut size = self.surface.text_extent(text);
        if let Some(max) = max_size {
            size.width = size.width.min(max.width);
            size.height = size.height.min(max.height);
        }

        let mut xf = Affine::translate(p.to_vec2());
        if rotate.abs() > f64::EPSILON {
            xf *= Affine::rotate(rotate.to_radians());
        }
        xf *= Affine::translate(anchor_offset(size, halign, valign));

        self.surface.transform(xf);
        self.surface
            .fill_text(text, Point::new(0.0, size.height), fill);
        self.surface.restore()?;
        Ok(())
    }

    /// Measures `text` without drawing it. Empty text measures zero.
    pub fn measure_text(
        &mut self,
        text: &str,
        font_family: &str,
        font_size: f64,
        font_weight: FontWeight,
    ) -> Result<Size, Error> {
        if text.is_empty() {
            return Ok(Size::ZERO);
        }
        self.surface.save()?;
        self.surface.set_font(font_family, font_size, font_weight);
        let size = self.surface.text_extent(text);
        self.surface.restore()?;
        Ok(size)
    }

    /// Draws the `src` sub-rectangle of `source` (in image pixel units)
    /// scaled into `dest`.
    ///
    /// The image is resolved through the cache, decoding at most once
    /// per source identity. Cropping is done by clipping to `dest`,
    /// scaling by dest/src and offsetting the full image by the source
    /// origin. A decode failure is fatal for this call and propagates;
    /// an absent source or degenerate rectangle draws nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        source: Option<&ImageSource>,
        src: Rect,
        dest: Rect,
        opacity: f64,
        interpolate: bool,
    ) -> Result<(), Error> {
        if src.width() <= 0.0 || src.height() <= 0.0 || dest.width() <= 0.0 || dest.height() <= 0.0
        {
            return Ok(());
        }
        let Some(source) = source else {
            return Ok(());
        };
        self.resolve(source)?;
        let image = &self.images[source];

        let surface = &mut self.surface;
        surface.save()?;
        surface.clip_rect(dest);
        surface.transform(
            Affine::translate(dest.origin().to_vec2())
                * Affine::scale_non_uniform(dest.width() / src.width(), dest.height() / src.height())
                * Affine::translate(Vec2::new(-src.x0, -src.y0)),
        );
        surface.draw_image(image, opacity, interpolate);
        surface.restore()?;
        Ok(())
    }

    /// Resolves `source` through the image cache, marking it in-use for
    /// the current cycle.
    ///
    /// `None` yields `Ok(None)`. A cached entry is returned unchanged;
    /// otherwise the bytes are decoded through the surface and the
    /// result cached under the source's identity.
    pub fn get_image(&mut self, source: Option<&ImageSource>) -> Result<Option<&S::Image>, Error> {
        let Some(source) = source else {
            return Ok(None);
        };
        self.resolve(source)?;
        Ok(self.images.get(source))
    }

    /// Releases every cached image not touched since the last cleanup,
    /// then clears the in-use set.
    ///
    /// Call this once per frame boundary. Calling it mid-frame evicts
    /// images the frame has not reached yet; never calling it keeps
    /// decoded images alive indefinitely. Safe to call repeatedly: a
    /// second call with no intervening draws evicts everything and is
    /// then a no-op.
    pub fn clean_up(&mut self) {
        let in_use = &self.in_use;
        self.images.retain(|source, _| in_use.contains(source));
        self.in_use.clear();
    }

    /// Intersects the active clip region with `rect`. Returns whether
    /// the surface applied it; `false` means the surface cannot clip and
    /// the caller should degrade gracefully.
    pub fn set_clip(&mut self, rect: Rect) -> bool {
        self.surface.clip_rect(rect)
    }

    /// Removes all clipping.
    pub fn reset_clip(&mut self) {
        self.surface.reset_clip();
    }

    fn resolve(&mut self, source: &ImageSource) -> Result<(), Error> {
        self.in_use.insert(source.clone());
        if !self.images.contains_key(source) {
            let decoded = self.surface.decode_image(source.data())?;
            self.images.insert(source.clone(), decoded);
        }
        Ok(())
    }
}

fn pen_style(line_join: LineJoin, dash: Option<&[f64]>) -> StrokeStyle {
    StrokeStyle {
        line_join,
        dash: dash.map(<[f64]>::to_vec),
    }
}

fn polyline(points: &[Point], aliased: bool, close: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut points = points.iter().map(|&p| maybe_snap(p, aliased));
    if let Some(first) = points.next() {
        path.move_to(first);
        for p in points {
            path.line_to(p);
        }
        if close {
            path.close_path();
        }
    }
    path
}

/// Snap to half-pixel centers so one-device-unit strokes land on whole
/// pixels instead of straddling two.
fn maybe_snap(p: Point, aliased: bool) -> Point {
    if aliased {
        Point::new(p.x.trunc() + 0.5, p.y.trunc() + 0.5)
    } else {
        p
    }
}

/// Offset from the anchor point to the top-left corner of a text block
/// of the given measured size.
fn anchor_offset(size: Size, halign: HorizontalAlignment, valign: VerticalAlignment) -> Vec2 {
    let dx = match halign {
        HorizontalAlignment::Left => 0.0,
        HorizontalAlignment::Center => -size.width / 2.0,
        HorizontalAlignment::Right => -size.width,
    };
    let dy = match valign {
        VerticalAlignment::Top => 0.0,
        VerticalAlignment::Middle => -size.height / 2.0,
        VerticalAlignment::Bottom => -size.height,
    };
    Vec2::new(dx, dy)
}
