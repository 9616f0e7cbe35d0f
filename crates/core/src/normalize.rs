//! Conversion of extraction-space glyph runs into top-left page space
//!
//! The extraction service reports runs with a bottom-left origin and a
//! baseline-anchored text matrix. Everything downstream (clipping, item
//! placement, pointer hit tests) works top-left, y-down, so every run goes
//! through [`normalize_run`] exactly once at the boundary.

use crate::config::ReconstructConfig;
use doc_model::Rect;
use pdf_engine::RawTextRun;

/// One glyph run in top-left page space
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub size: f32,
    pub raw_font_name: String,
    pub bold: bool,
    pub italic: bool,
}

impl Fragment {
    pub fn bbox(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Estimated baseline, `baseline_ratio` of the way down the box
    pub fn baseline(&self, config: &ReconstructConfig) -> f32 {
        self.y + self.h * config.baseline_ratio
    }

    /// Whitespace-only or zero-width runs
    pub fn is_blank(&self) -> bool {
        self.w <= 0.0 || self.text.trim().is_empty()
    }
}

pub fn normalize_run(run: &RawTextRun, page_height: f32, config: &ReconstructConfig) -> Fragment {
    let [a, _, _, d, e, f] = run.transform;
    let size = a.abs().max(d.abs());

    Fragment {
        text: run.text.clone(),
        x: e,
        y: page_height - f - size,
        w: run.width.max(0.0),
        h: size * config.box_height_ratio,
        size,
        raw_font_name: run.font_name.clone(),
        bold: run.bold,
        italic: run.italic,
    }
}

/// Normalize a page's runs, skipping runs with no text
pub fn normalize_runs(
    runs: &[RawTextRun],
    page_height: f32,
    config: &ReconstructConfig,
) -> Vec<Fragment> {
    runs.iter()
        .filter(|run| !run.text.is_empty())
        .map(|run| normalize_run(run, page_height, config))
        .collect()
}

/// Ratio between rendered pixels and document points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pt_per_px: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pt_per_px: 1.0 }
    }
}

impl Viewport {
    /// Viewport for a raster rendered at `scale` pixels per point
    pub fn from_render_scale(scale: f32) -> Self {
        if scale > 0.0 {
            Self { pt_per_px: 1.0 / scale }
        } else {
            Self::default()
        }
    }

    pub fn rect_to_points(&self, rect_px: Rect) -> Rect {
        rect_px.scaled(self.pt_per_px)
    }

    pub fn rect_to_pixels(&self, rect_pt: Rect) -> Rect {
        rect_pt.scaled(1.0 / self.pt_per_px)
    }

    pub fn point_to_pixels(&self, x_pt: f32, y_pt: f32) -> (f32, f32) {
        (x_pt / self.pt_per_px, y_pt / self.pt_per_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(transform: [f32; 6], width: f32) -> RawTextRun {
        RawTextRun {
            text: "Invoice".to_owned(),
            transform,
            width,
            font_name: "Times-Roman".to_owned(),
            bold: false,
            italic: false,
        }
    }

    #[test]
    fn test_vertical_placement_uses_baseline_and_size() {
        let config = ReconstructConfig::default();
        let fragment = normalize_run(&run([11.0, 0.0, 0.0, 11.0, 72.0, 700.0], 40.0), 792.0, &config);

        assert_eq!(fragment.x, 72.0);
        assert_eq!(fragment.y, 81.0);
        assert_eq!(fragment.size, 11.0);
        assert_eq!(fragment.w, 40.0);
        assert!((fragment.h - 13.2).abs() < 1e-4);
        assert!((fragment.baseline(&config) - (81.0 + 13.2 * 0.85)).abs() < 1e-4);
    }

    #[test]
    fn test_size_uses_largest_scale_magnitude() {
        let config = ReconstructConfig::default();
        let fragment = normalize_run(&run([-9.0, 0.0, 0.0, 14.0, 0.0, 100.0], 10.0), 200.0, &config);

        assert_eq!(fragment.size, 14.0);
        assert_eq!(fragment.y, 86.0);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let config = ReconstructConfig::default();
        let raw = run([10.5, 0.0, 0.0, 10.5, 33.3, 412.7], 51.2);

        let first = normalize_run(&raw, 842.0, &config);
        let second = normalize_run(&raw, 842.0, &config);
        assert_eq!(first, second);
        assert_eq!(first.bbox(), second.bbox());
    }

    #[test]
    fn test_empty_runs_are_skipped() {
        let config = ReconstructConfig::default();
        let mut empty = run([10.0, 0.0, 0.0, 10.0, 0.0, 0.0], 0.0);
        empty.text.clear();

        let fragments = normalize_runs(&[empty, run([10.0, 0.0, 0.0, 10.0, 5.0, 5.0], 20.0)], 100.0, &config);
        assert_eq!(fragments.len(), 1);
    }

    #[test]
    fn test_viewport_converts_between_spaces() {
        let viewport = Viewport::from_render_scale(2.0);
        assert_eq!(viewport.pt_per_px, 0.5);
        assert_eq!(
            viewport.rect_to_points(Rect::new(100.0, 50.0, 20.0, 10.0)),
            Rect::new(50.0, 25.0, 10.0, 5.0)
        );
        assert_eq!(viewport.point_to_pixels(10.0, 4.0), (20.0, 8.0));
        assert_eq!(Viewport::from_render_scale(0.0).pt_per_px, 1.0);
    }
}
