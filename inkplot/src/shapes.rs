//! Options for stroking paths.

/// Pen attributes for stroked lines.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct StrokeStyle {
    pub line_join: LineJoin,
    /// On/off lengths of the dash pattern; `None` draws solid.
    pub dash: Option<Vec<f64>>,
}

/// Options for angled joins in strokes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl StrokeStyle {
    pub fn new() -> StrokeStyle {
        StrokeStyle::default()
    }

    pub fn with_line_join(mut self, line_join: LineJoin) -> Self {
        self.line_join = line_join;
        self
    }

    pub fn with_dash(mut self, dashes: Vec<f64>) -> Self {
        self.dash = Some(dashes);
        self
    }
}
