//! Tunable constants of the reconstruction pipeline
//!
//! Every field has a default matching the editor's long-standing behavior;
//! a partial `config.json` only overrides the keys it names.

use serde::{Deserialize, Serialize};

/// How the color sampler probes the rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMode {
    /// Square window around the line center, grown until ink is found
    #[default]
    Point,
    /// Fixed probe grid across the line box
    Grid,
}

/// When the style classifier emits faux bold / skew parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisPolicy {
    /// Synthesize on top of the variant face whenever bold or oblique is detected
    #[default]
    Always,
    /// Use the variant face when the catalog has it, otherwise the family's
    /// regular face plus synthesis
    MissingVariantsOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub mode: SampleMode,
    /// Probes with luminance above this are treated as paper
    pub near_white: f32,
    /// First search radius in pixels (point mode)
    pub seed_radius: u32,
    /// Radius cap in pixels (point mode)
    pub max_radius: u32,
    pub grid_columns: u32,
    pub grid_rows: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            mode: SampleMode::Point,
            near_white: 235.0,
            seed_radius: 2,
            max_radius: 16,
            grid_columns: 12,
            grid_rows: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub policy: SynthesisPolicy,
    /// Extra render passes for synthesized bold (clamped to 0..=3)
    pub faux_bold: u8,
    /// Shear for synthesized italics
    pub skew_degrees: f32,
    /// Faces the export step can draw natively
    pub available_faces: Vec<String>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            policy: SynthesisPolicy::Always,
            faux_bold: 1,
            skew_degrees: 12.0,
            available_faces: crate::style::STANDARD_FACES.iter().map(|face| face.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructConfig {
    /// Fragment box height as a multiple of font size
    pub box_height_ratio: f32,
    /// Baseline position as a fraction of box height from the top
    pub baseline_ratio: f32,
    pub line_tolerance_ratio: f32,
    pub line_tolerance_min: f32,
    /// Horizontal overlap fraction that keeps a fragment
    pub clip_overlap_fraction: f32,
    pub space_gap_ratio: f32,
    pub space_gap_min: f32,
    pub size_tolerance_abs: f32,
    pub size_tolerance_rel: f32,
    pub leading_ratio: f32,
    pub leading_min: f32,
    /// Allowed top-to-top gap as a multiple of the expected leading
    pub gap_factor: f32,
    pub line_height_ratio: f32,
    pub min_item_width: f32,
    /// Marquee selections smaller than this (in pixels) are ignored
    pub min_selection_px: f32,
    pub eyedrop_min_size: f32,
    pub sampler: SamplerConfig,
    pub synthesis: SynthesisConfig,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            box_height_ratio: 1.2,
            baseline_ratio: 0.85,
            line_tolerance_ratio: 0.5,
            line_tolerance_min: 2.5,
            clip_overlap_fraction: 0.65,
            space_gap_ratio: 0.55,
            space_gap_min: 4.0,
            size_tolerance_abs: 0.6,
            size_tolerance_rel: 0.05,
            leading_ratio: 1.2,
            leading_min: 12.0,
            gap_factor: 1.6,
            line_height_ratio: 1.35,
            min_item_width: 16.0,
            min_selection_px: 5.0,
            eyedrop_min_size: 6.0,
            sampler: SamplerConfig::default(),
            synthesis: SynthesisConfig::default(),
        }
    }
}

impl ReconstructConfig {
    /// Baseline distance under which two fragments share a line
    pub fn line_tolerance(&self, median_size: f32) -> f32 {
        (self.line_tolerance_ratio * median_size).max(self.line_tolerance_min)
    }

    /// Gap above which adjacent fragments are joined with a space
    pub fn space_gap(&self, mean_size: f32) -> f32 {
        (self.space_gap_ratio * mean_size).max(self.space_gap_min)
    }

    pub fn size_tolerance(&self, anchor_size: f32) -> f32 {
        (self.size_tolerance_rel * anchor_size).max(self.size_tolerance_abs)
    }

    pub fn expected_leading(&self, size: f32) -> f32 {
        (size * self.leading_ratio).max(self.leading_min)
    }

    /// Line height for blocks with a single line
    pub fn fallback_line_height(&self, size: f32) -> f32 {
        (size * self.line_height_ratio).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ReconstructConfig = serde_json::from_str(
            r#"{"gap_factor": 2.0, "sampler": {"mode": "grid"}}"#,
        )
        .expect("parse config");

        assert_eq!(config.gap_factor, 2.0);
        assert_eq!(config.sampler.mode, SampleMode::Grid);
        assert_eq!(config.sampler.max_radius, 16);
        assert_eq!(config.box_height_ratio, 1.2);
        assert_eq!(config.synthesis.policy, SynthesisPolicy::Always);
        assert_eq!(config.synthesis.available_faces.len(), 12);
    }

    #[test]
    fn test_tolerances_have_floors() {
        let config = ReconstructConfig::default();

        assert_eq!(config.line_tolerance(2.0), 2.5);
        assert_eq!(config.line_tolerance(12.0), 6.0);
        assert_eq!(config.space_gap(4.0), 4.0);
        assert_eq!(config.size_tolerance(10.0), 0.6);
        assert_eq!(config.size_tolerance(40.0), 2.0);
        assert_eq!(config.expected_leading(8.0), 12.0);
        assert_eq!(config.fallback_line_height(11.0), 15.0);
    }
}
