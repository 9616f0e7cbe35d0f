//! Text color estimation from the rendered page
//!
//! Probes brighter than the near-white threshold are paper and get dropped;
//! the per-channel median of what remains is the ink color. A region with no
//! ink at all yields black.

use crate::config::{SampleMode, SamplerConfig};
use crate::normalize::Viewport;
use doc_model::{Rect, Rgb};

/// Read access to rendered pixels
pub trait PixelSource {
    fn dimensions(&self) -> (u32, u32);

    /// Color at `(x, y)`; callers stay inside `dimensions`
    fn pixel(&self, x: u32, y: u32) -> Rgb;
}

impl PixelSource for image::RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        image::RgbaImage::dimensions(self)
    }

    /// Translucent pixels are composited over white paper
    fn pixel(&self, x: u32, y: u32) -> Rgb {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        let over_white = |channel: u8| {
            let alpha = u32::from(a);
            ((u32::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        Rgb::new(over_white(r), over_white(g), over_white(b))
    }
}

/// Per-channel upper median
fn median_color(samples: &[Rgb]) -> Option<Rgb> {
    if samples.is_empty() {
        return None;
    }
    let channel = |select: fn(&Rgb) -> u8| {
        let mut values: Vec<u8> = samples.iter().map(select).collect();
        values.sort_unstable();
        values[values.len() / 2]
    };
    Some(Rgb::new(channel(|c| c.r), channel(|c| c.g), channel(|c| c.b)))
}

fn is_ink(color: &Rgb, config: &SamplerConfig) -> bool {
    color.luminance() <= config.near_white
}

fn fallback_black(mode: SampleMode) -> Rgb {
    tracing::debug!(?mode, "no ink found, defaulting to black");
    Rgb::BLACK
}

/// Median ink color around a pixel, widening the window until ink appears
pub fn sample_point<P>(source: &P, x_px: f32, y_px: f32, config: &SamplerConfig) -> Rgb
where
    P: PixelSource + ?Sized,
{
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return fallback_black(SampleMode::Point);
    }

    let cx = (x_px.round() as i64).clamp(0, i64::from(width) - 1);
    let cy = (y_px.round() as i64).clamp(0, i64::from(height) - 1);
    let max_radius = config.max_radius.max(config.seed_radius);
    let mut radius = config.seed_radius;

    loop {
        let r = i64::from(radius);
        let mut samples = Vec::new();
        for y in (cy - r).max(0)..=(cy + r).min(i64::from(height) - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(i64::from(width) - 1) {
                let color = source.pixel(x as u32, y as u32);
                if is_ink(&color, config) {
                    samples.push(color);
                }
            }
        }

        if let Some(color) = median_color(&samples) {
            return color;
        }
        if radius >= max_radius {
            return fallback_black(SampleMode::Point);
        }
        radius = (radius * 2).max(radius + 1).min(max_radius);
    }
}

/// Median ink color over a probe grid spanning `rect_px`
///
/// Only the darker half of the probes is considered before the near-white
/// filter, so mostly-paper rectangles still resolve to their ink.
pub fn sample_grid<P>(source: &P, rect_px: Rect, config: &SamplerConfig) -> Rgb
where
    P: PixelSource + ?Sized,
{
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return fallback_black(SampleMode::Grid);
    }

    let columns = config.grid_columns.max(1);
    let rows = config.grid_rows.max(1);
    let mut probes = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let x = rect_px.x + (column as f32 + 0.5) * rect_px.w / columns as f32;
            let y = rect_px.y + (row as f32 + 0.5) * rect_px.h / rows as f32;
            let x = (x.floor() as i64).clamp(0, i64::from(width) - 1) as u32;
            let y = (y.floor() as i64).clamp(0, i64::from(height) - 1) as u32;
            probes.push(source.pixel(x, y));
        }
    }

    probes.sort_by(|a, b| a.luminance().total_cmp(&b.luminance()));
    probes.truncate(probes.len().div_ceil(2));
    probes.retain(|color| is_ink(color, config));

    median_color(&probes).unwrap_or_else(|| fallback_black(SampleMode::Grid))
}

/// Ink color of a text box given in page points
pub fn sample_text_color<P>(
    source: &P,
    bbox_pt: Rect,
    viewport: Viewport,
    config: &SamplerConfig,
) -> Rgb
where
    P: PixelSource + ?Sized,
{
    match config.mode {
        SampleMode::Point => {
            let (x, y) = viewport.point_to_pixels(bbox_pt.center_x(), bbox_pt.center_y());
            sample_point(source, x, y, config)
        }
        SampleMode::Grid => sample_grid(source, viewport.rect_to_pixels(bbox_pt), config),
    }
}
