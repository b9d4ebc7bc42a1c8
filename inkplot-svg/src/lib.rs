//! SVG output for the inkplot render context.
//!
//! Shapes, text, clipping and images map directly onto SVG elements;
//! raster sources are embedded as base64 data URIs. Text *measurement*
//! is approximate (there is no shaper here; glyph layout is left to the
//! SVG viewer): the extent heuristic assumes 0.6 em per character and a
//! one-em line height, which is adequate for chart label anchoring.

use std::{fmt, io, mem};

use inkplot::kurbo::{Affine, BezPath, Point, Rect, Size};
use inkplot::{Color, Error, FontWeight, LineJoin, StrokeStyle, Surface, DEFAULT_FONT_SIZE};
use svg::node::element;
use svg::node::Node;

/// Advance per character, as a fraction of the font size.
const CHAR_ADVANCE_EM: f64 = 0.6;

/// A [`Surface`] that accumulates an SVG document.
pub struct SvgSurface {
    doc: svg::Document,
    stack: Vec<State>,
    state: State,
    next_id: u64,
}

impl SvgSurface {
    /// Construct an empty surface; `size` sets the viewBox if given.
    pub fn new(size: Option<Size>) -> SvgSurface {
        let mut doc = svg::Document::new();
        if let Some(size) = size {
            doc = doc.set("viewBox", (0.0, 0.0, size.width, size.height));
        }
        SvgSurface {
            doc,
            stack: Vec::new(),
            state: State::default(),
            next_id: 0,
        }
    }

    /// Write the document rendered so far to `writer`.
    ///
    /// Additional rendering can be done afterwards.
    pub fn write(&self, writer: impl io::Write) -> io::Result<()> {
        svg::write(writer, &self.doc)
    }

    /// The accumulated document.
    pub fn document(&self) -> &svg::Document {
        &self.doc
    }

    fn new_id(&mut self) -> Id {
        let id = Id(self.next_id);
        self.next_id += 1;
        id
    }

    fn attrs<'a>(&self) -> Attrs<'a> {
        Attrs {
            xf: self.state.xf,
            clip: self.state.clip,
            crisp: self.state.crisp,
            fill: None,
            stroke: None,
        }
    }
}

impl Surface for SvgSurface {
    type Image = SvgImage;

    fn save(&mut self) -> Result<(), Error> {
        let new = self.state.clone();
        self.stack.push(mem::replace(&mut self.state, new));
        Ok(())
    }

    fn restore(&mut self) -> Result<(), Error> {
        self.state = self.stack.pop().ok_or(Error::StackUnbalance)?;
        Ok(())
    }

    fn transform(&mut self, transform: Affine) {
        self.state.xf *= transform;
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        let attrs = Attrs {
            fill: Some(color),
            ..self.attrs()
        };
        add_path(&mut self.doc, path, &attrs);
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64, style: &StrokeStyle) {
        let attrs = Attrs {
            stroke: Some((color, width, style)),
            ..self.attrs()
        };
        add_path(&mut self.doc, path, &attrs);
    }

    fn set_antialias(&mut self, enabled: bool) {
        self.state.crisp = !enabled;
    }

    fn clip_rect(&mut self, rect: Rect) -> bool {
        let id = self.new_id();
        let mut clip = element::ClipPath::new().set("id", id);
        // Nesting clip paths intersects them.
        if let Some(prev) = self.state.clip {
            clip.assign("clip-path", format!("url(#{prev})"));
        }
        let mut shape = element::Rectangle::new()
            .set("x", rect.x0)
            .set("y", rect.y0)
            .set("width", rect.width())
            .set("height", rect.height());
        shape.assign("transform", xf_val(&self.state.xf));
        clip.append(shape);
        self.doc.append(clip);
        self.state.clip = Some(id);
        true
    }

    fn reset_clip(&mut self) {
        self.state.clip = None;
    }

    fn set_font(&mut self, family: &str, size: f64, weight: FontWeight) {
        self.state.font = Some(FontSpec {
            family: family.to_owned(),
            size,
            weight,
        });
    }

    fn text_extent(&mut self, text: &str) -> Size {
        let size = self
            .state
            .font
            .as_ref()
            .map_or(DEFAULT_FONT_SIZE, |f| f.size);
        Size::new(
            CHAR_ADVANCE_EM * size * text.chars().count() as f64,
            size,
        )
    }

    fn fill_text(&mut self, text: &str, origin: Point, color: Color) {
        let font = self.state.font.clone().unwrap_or_default();
        let mut node = element::Text::new(text)
            .set("x", origin.x)
            .set("y", origin.y)
            .set(
                "style",
                format!(
                    "font-size:{}px;font-family:\"{}\";font-weight:{};fill:{};fill-opacity:{}",
                    font.size,
                    font.family,
                    font.weight.to_raw(),
                    fmt_color(color),
                    fmt_opacity(color),
                ),
            );
        node.assign("transform", xf_val(&self.state.xf));
        if let Some(id) = self.state.clip {
            node.assign("clip-path", format!("url(#{id})"));
        }
        self.doc.append(node);
    }

    fn decode_image(&mut self, data: &[u8]) -> Result<SvgImage, Error> {
        let decoded = image::load_from_memory(data).map_err(Error::from)?;
        let mime = match image::guess_format(data) {
            Ok(image::ImageFormat::Png) => "image/png",
            Ok(image::ImageFormat::Jpeg) => "image/jpeg",
            Ok(image::ImageFormat::Gif) => "image/gif",
            Ok(image::ImageFormat::Bmp) => "image/bmp",
            _ => "application/octet-stream",
        };
        Ok(SvgImage {
            href: format!("data:{};base64,{}", mime, base64::encode(data)),
            size: Size::new(decoded.width() as f64, decoded.height() as f64),
        })
    }

    fn image_size(&self, image: &SvgImage) -> Size {
        image.size
    }

    fn draw_image(&mut self, image: &SvgImage, opacity: f64, interpolate: bool) {
        let mut node = element::Image::new()
            .set("x", 0.0)
            .set("y", 0.0)
            .set("width", image.size.width)
            .set("height", image.size.height)
            .set("href", image.href.as_str());
        node.assign("transform", xf_val(&self.state.xf));
        if let Some(id) = self.state.clip {
            node.assign("clip-path", format!("url(#{id})"));
        }
        if opacity < 1.0 {
            node.assign("opacity", opacity);
        }
        if !interpolate {
            node.assign("image-rendering", "pixelated");
        }
        self.doc.append(node);
    }
}

/// A decoded image, held as a data URI plus its intrinsic size.
#[derive(Debug, Clone)]
pub struct SvgImage {
    href: String,
    size: Size,
}

#[derive(Debug, Clone, Default)]
struct State {
    xf: Affine,
    clip: Option<Id>,
    font: Option<FontSpec>,
    crisp: bool,
}

#[derive(Debug, Clone)]
struct FontSpec {
    family: String,
    size: f64,
    weight: FontWeight,
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec {
            family: "sans-serif".to_owned(),
            size: DEFAULT_FONT_SIZE,
            weight: FontWeight::REGULAR,
        }
    }
}

struct Attrs<'a> {
    xf: Affine,
    clip: Option<Id>,
    crisp: bool,
    fill: Option<Color>,
    stroke: Option<(Color, f64, &'a StrokeStyle)>,
}

impl Attrs<'_> {
    fn apply_to(&self, node: &mut impl Node) {
        node.assign("transform", xf_val(&self.xf));
        if let Some(id) = self.clip {
            node.assign("clip-path", format!("url(#{id})"));
        }
        if self.crisp {
            node.assign("shape-rendering", "crispEdges");
        }
        if let Some(color) = self.fill {
            node.assign("fill", fmt_color(color));
            node.assign("fill-opacity", fmt_opacity(color));
        } else {
            node.assign("fill", "none");
        }
        if let Some((color, width, style)) = self.stroke {
            node.assign("stroke", fmt_color(color));
            node.assign("stroke-opacity", fmt_opacity(color));
            node.assign("stroke-width", width);
            match style.line_join {
                LineJoin::Miter => (),
                LineJoin::Round => node.assign("stroke-linejoin", "round"),
                LineJoin::Bevel => node.assign("stroke-linejoin", "bevel"),
            }
            if let Some(dash) = &style.dash {
                if !dash.is_empty() {
                    node.assign("stroke-dasharray", dash.clone());
                }
            }
        }
    }
}

fn add_path(doc: &mut svg::Document, path: &BezPath, attrs: &Attrs) {
    let mut node = element::Path::new().set("d", path.to_svg());
    attrs.apply_to(&mut node);
    doc.append(node);
}

fn xf_val(xf: &Affine) -> svg::node::Value {
    let c = xf.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        c[0], c[1], c[2], c[3], c[4], c[5]
    )
    .into()
}

// RGB in hex representation
fn fmt_color(color: Color) -> String {
    format!("#{:06x}", color.as_rgba32() >> 8)
}

// Opacity as value from [0, 1]
fn fmt_opacity(color: Color) -> String {
    format!("{}", color.alpha())
}

#[derive(Debug, Copy, Clone)]
struct Id(u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut out = String::with_capacity(4);
        let mut x = self.0;
        loop {
            let digit = (x % ALPHABET.len() as u64) as usize;
            out.push(ALPHABET[digit] as char);
            x /= ALPHABET.len() as u64;
            if x == 0 {
                break;
            }
        }
        f.write_str(&out)
    }
}

impl From<Id> for svg::node::Value {
    fn from(id: Id) -> Self {
        id.to_string().into()
    }
}
