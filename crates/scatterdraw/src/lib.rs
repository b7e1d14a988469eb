#![forbid(unsafe_code)]

//! Scale-agnostic scatter plots.
//!
//! The plot is fitted to the bounding box of its dots, so callers never pick a coordinate range.

pub mod error;

pub use error::{Error, Result};
pub use tiny_skia::{Color, Pixmap};

/// Dot diameter, relative to the larger side of the dot bounding box.
const POINT_SIZE: f64 = 30.0 / 512.0;
/// Margin added on every side, relative to the larger side of the dot bounding box.
const MARGIN_SIZE: f64 = 40.0 / 512.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    dot_size: f64,
}

impl Bounds {
    fn of(dots: &[Dot]) -> Result<Self> {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (index, d) in dots.iter().enumerate() {
            if !(d.x.is_finite() && d.y.is_finite()) {
                return Err(Error::NonFiniteCoordinate { index });
            }
            min_x = min_x.min(d.x);
            min_y = min_y.min(d.y);
            max_x = max_x.max(d.x);
            max_y = max_y.max(d.y);
        }

        let mut size = (max_x - min_x).max(max_y - min_y);
        if size <= 0.0 {
            // One dot, or all dots stacked: fall back to a unit box around them.
            size = 1.0;
            min_x -= 0.5;
            max_x += 0.5;
            min_y -= 0.5;
            max_y += 0.5;
        }
        let margin = MARGIN_SIZE * size;
        Ok(Self {
            min_x: min_x - margin,
            min_y: min_y - margin,
            max_x: max_x + margin,
            max_y: max_y + margin,
            dot_size: size * POINT_SIZE,
        })
    }

    fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Draws `dots` into a transparent `out_size` x `out_size` image.
pub fn draw(dots: &[Dot], out_size: u32) -> Result<Pixmap> {
    if out_size == 0 {
        return Err(Error::ZeroSize);
    }
    let mut pixmap =
        Pixmap::new(out_size, out_size).ok_or(Error::PixmapAllocation { size: out_size })?;
    if dots.is_empty() {
        return Ok(pixmap);
    }

    let bounds = Bounds::of(dots)?;
    let full_size = bounds.width().max(bounds.height());
    // Center the shorter axis.
    let x_margin = full_size / 2.0 - bounds.width() / 2.0;
    let y_margin = full_size / 2.0 - bounds.height() / 2.0;
    let scale = f64::from(out_size) / full_size;
    let radius = (bounds.dot_size * scale / 2.0) as f32;

    let mut paint = tiny_skia::Paint::default();
    paint.anti_alias = true;
    for d in dots {
        let cx = scale * (x_margin + (d.x - bounds.min_x));
        let cy = scale * (y_margin + (d.y - bounds.min_y));
        let Some(path) = tiny_skia::PathBuilder::from_circle(cx as f32, cy as f32, radius) else {
            continue;
        };
        paint.set_color(d.color);
        pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            tiny_skia::Transform::identity(),
            None,
        );
    }
    tracing::debug!(dots = dots.len(), out_size, scale, "scatter plot drawn");
    Ok(pixmap)
}

/// Draws solved `distplot` points, coloring point `i` with `colors[i]`.
pub fn draw_distplot(
    points: &[distplot::Point],
    colors: &[Color],
    out_size: u32,
) -> Result<Pixmap> {
    if colors.len() < points.len() {
        return Err(Error::NotEnoughColors {
            points: points.len(),
            colors: colors.len(),
        });
    }
    let dots = points
        .iter()
        .zip(colors)
        .map(|(p, &color)| Dot {
            x: p.x,
            y: p.y,
            color,
        })
        .collect::<Vec<_>>();
    draw(&dots, out_size)
}

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|err| Error::PngEncode(err.to_string()))
}
