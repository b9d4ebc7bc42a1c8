//! A surface that records commands instead of drawing.

use kurbo::{Affine, BezPath, Point, Rect, Size};

use crate::{Color, Error, FontWeight, StrokeStyle, Surface, DEFAULT_FONT_SIZE};

/// One recorded surface call.
#[derive(Debug, Clone)]
pub enum Command {
    Save,
    Restore,
    Transform(Affine),
    SetAntialias(bool),
    FillPath {
        path: BezPath,
        color: Color,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        width: f64,
        style: StrokeStyle,
    },
    ClipRect(Rect),
    ResetClip,
    SetFont {
        family: String,
        size: f64,
        weight: FontWeight,
    },
    FillText {
        text: String,
        origin: Point,
        color: Color,
    },
    DrawImage {
        size: Size,
        opacity: f64,
        interpolate: bool,
    },
}

impl Command {
    /// Whether this command paints anything, as opposed to changing state.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            Command::FillPath { .. }
                | Command::StrokePath { .. }
                | Command::FillText { .. }
                | Command::DrawImage { .. }
        )
    }
}

/// A decoded image as seen by the recording surface: dimensions only.
#[derive(Debug, Clone, Copy)]
pub struct RecordedImage {
    pub size: Size,
}

#[derive(Clone, Default)]
struct State {
    font: Option<(String, f64, FontWeight)>,
}

/// A surface that doesn't draw.
///
/// Every call is appended to a command log that tests (or tools doing
/// layout-only passes) can inspect. Text measurement uses a fixed
/// per-character advance so results are deterministic; tests that need a
/// particular extent can pin one with [`fix_text_extent`].
///
/// [`fix_text_extent`]: RecordingSurface::fix_text_extent
#[derive(Default)]
pub struct RecordingSurface {
    commands: Vec<Command>,
    stack: Vec<State>,
    state: State,
    decode_count: usize,
    fixed_text_extent: Option<Size>,
}

impl RecordingSurface {
    pub fn new() -> RecordingSurface {
        RecordingSurface::default()
    }

    /// The commands recorded so far, in call order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Forget recorded commands; decoded-image bookkeeping is kept.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// How many times [`Surface::decode_image`] ran.
    pub fn decode_count(&self) -> usize {
        self.decode_count
    }

    /// Make [`Surface::text_extent`] return `size` regardless of input.
    pub fn fix_text_extent(&mut self, size: Size) {
        self.fixed_text_extent = Some(size);
    }
}

impl Surface for RecordingSurface {
    type Image = RecordedImage;

    fn save(&mut self) -> Result<(), Error> {
        self.stack.push(self.state.clone());
        self.commands.push(Command::Save);
        Ok(())
    }

    fn restore(&mut self) -> Result<(), Error> {
        self.state = self.stack.pop().ok_or(Error::StackUnbalance)?;
        self.commands.push(Command::Restore);
        Ok(())
    }

    fn transform(&mut self, transform: Affine) {
        self.commands.push(Command::Transform(transform));
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(Command::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, style: &StrokeStyle) {
        self.commands.push(Command::StrokePath {
            path: path.clone(),
            color,
            width,
            style: style.clone(),
        });
    }

    fn set_antialias(&mut self, enabled: bool) {
        self.commands.push(Command::SetAntialias(enabled));
    }

    fn clip_rect(&mut self, rect: Rect) -> bool {
        self.commands.push(Command::ClipRect(rect));
        true
    }

    fn reset_clip(&mut self) {
        self.commands.push(Command::ResetClip);
    }

    fn set_font(&mut self, family: &str, size: f64, weight: FontWeight) {
        self.state.font = Some((family.to_owned(), size, weight));
        self.commands.push(Command::SetFont {
            family: family.to_owned(),
            size,
            weight,
        });
    }

    fn text_extent(&mut self, text: &str) -> Size {
        if let Some(size) = self.fixed_text_extent {
            return size;
        }
        let font_size = self
            .state
            .font
            .as_ref()
            .map_or(DEFAULT_FONT_SIZE, |&(_, size, _)| size);
        Size::new(0.6 * font_size * text.chars().count() as f64, font_size)
    }

    fn fill_text(&mut self, text: &str, origin: Point, color: Color) {
        self.commands.push(Command::FillText {
            text: text.to_owned(),
            origin,
            color,
        });
    }

    fn decode_image(&mut self, data: &[u8]) -> Result<Self::Image, Error> {
        let decoded = image::load_from_memory(data)?;
        self.decode_count += 1;
        Ok(RecordedImage {
            size: Size::new(decoded.width() as f64, decoded.height() as f64),
        })
    }

    fn image_size(&self, image: &Self::Image) -> Size {
        image.size
    }

    fn draw_image(&mut self, image: &Self::Image, opacity: f64, interpolate: bool) {
        self.commands.push(Command::DrawImage {
            size: image.size,
            opacity,
            interpolate,
        });
    }
}
