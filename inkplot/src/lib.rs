//! A backend-agnostic 2D render context for chart drawing.
//!
//! The charting engine hands this crate fully resolved screen-space
//! geometry and style values; [`RenderContext`] translates them into
//! calls against an injected [`Surface`] capability. Concrete surfaces
//! live in their own crates (for example `inkplot-svg`); a command-logging
//! [`RecordingSurface`] is provided here for tests and headless use.

pub use kurbo;

mod color;
mod error;
mod font;
mod recording;
mod render_context;
mod resource;
mod shapes;
mod surface;

pub use crate::color::*;
pub use crate::error::*;
pub use crate::font::*;
pub use crate::recording::*;
pub use crate::render_context::*;
pub use crate::resource::*;
pub use crate::shapes::*;
pub use crate::surface::*;
