//! Renders a small line chart to `chart.svg`.

use std::fs::File;

use inkplot::kurbo::{Point, Rect, Size};
use inkplot::{
    Color, FontWeight, HorizontalAlignment, LineJoin, RenderContext, VerticalAlignment,
};
use inkplot_svg::SvgSurface;

const SIZE: Size = Size::new(480.0, 320.0);
const MARGIN: f64 = 40.0;

const AXIS: Color = Color::rgb8(0x40, 0x40, 0x40);
const SERIES: Color = Color::rgb8(0x1f, 0x77, 0xb4);
const MARKER: Color = Color::rgb8(0xd6, 0x27, 0x28);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rc = RenderContext::new(SvgSurface::new(Some(SIZE)));

    let plot = Rect::new(MARGIN, MARGIN, SIZE.width - MARGIN, SIZE.height - MARGIN);
    rc.draw_rectangle(plot, Color::WHITE, AXIS, 1.0)?;

    // Gridlines, aliased so they stay sharp.
    for i in 1..5 {
        let y = plot.y0 + plot.height() * i as f64 / 5.0;
        rc.draw_line(
            &[Point::new(plot.x0, y), Point::new(plot.x1, y)],
            AXIS.with_alpha(0.25),
            1.0,
            Some(&[2.0, 2.0]),
            LineJoin::Miter,
            true,
        )?;
    }

    // One series with circular markers.
    let values = [0.31, 0.42, 0.39, 0.58, 0.77, 0.66, 0.91];
    let points: Vec<Point> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            Point::new(
                plot.x0 + plot.width() * i as f64 / (values.len() - 1) as f64,
                plot.y1 - plot.height() * v,
            )
        })
        .collect();
    rc.draw_line(&points, SERIES, 2.0, None, LineJoin::Round, false)?;
    for p in &points {
        rc.draw_ellipse(
            Rect::from_center_size(*p, Size::new(6.0, 6.0)),
            MARKER,
            Color::WHITE,
            1.0,
        )?;
    }

    rc.draw_text(
        Point::new(SIZE.width / 2.0, 12.0),
        "Throughput over time",
        AXIS,
        "sans-serif",
        16.0,
        FontWeight::BOLD,
        0.0,
        HorizontalAlignment::Center,
        VerticalAlignment::Top,
        None,
    )?;
    rc.draw_text(
        Point::new(12.0, SIZE.height / 2.0),
        "requests/s",
        AXIS,
        "sans-serif",
        12.0,
        FontWeight::REGULAR,
        -90.0,
        HorizontalAlignment::Center,
        VerticalAlignment::Middle,
        None,
    )?;

    rc.clean_up();
    rc.surface().write(File::create("chart.svg")?)?;
    Ok(())
}
