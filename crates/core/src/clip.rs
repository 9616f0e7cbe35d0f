//! Restricting assembled lines to a selection rectangle

use crate::config::ReconstructConfig;
use crate::lines::{dominant_fragment, fragments_bbox, Line};
use crate::normalize::Fragment;
use doc_model::Rect;

/// The part of a line inside the selection; never empty
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedLine {
    pub baseline: f32,
    pub fragments: Vec<Fragment>,
    pub bbox: Rect,
    /// Fragment texts re-joined with inferred word spaces
    pub text: String,
    pub dominant_font_name: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

/// Whether a fragment survives clipping against `selection`
///
/// Vertical intervals must overlap. Horizontally either enough of the
/// fragment lies inside or its center does; zero-width fragments only
/// have a center.
pub fn retains(fragment: &Fragment, selection: &Rect, config: &ReconstructConfig) -> bool {
    if fragment.bbox().vertical_overlap(selection) <= 0.0 {
        return false;
    }
    if fragment.w <= 0.0 {
        return selection.contains_x(fragment.x);
    }

    let fraction = fragment.bbox().horizontal_overlap(selection) / fragment.w;
    fraction >= config.clip_overlap_fraction || selection.contains_x(fragment.center_x())
}

/// Concatenate x-sorted fragments, restoring spaces across wide gaps
pub fn join_fragments(fragments: &[Fragment], config: &ReconstructConfig) -> String {
    let mut text = String::new();
    for (index, fragment) in fragments.iter().enumerate() {
        if let Some(previous) = index.checked_sub(1).map(|i| &fragments[i]) {
            let gap = fragment.x - previous.right();
            let threshold = config.space_gap((previous.size + fragment.size) / 2.0);
            let spaced = previous.text.ends_with(char::is_whitespace)
                || fragment.text.starts_with(char::is_whitespace);
            if gap > threshold && !spaced {
                text.push(' ');
            }
        }
        text.push_str(&fragment.text);
    }
    text
}

pub fn clip_line(line: &Line, selection: &Rect, config: &ReconstructConfig) -> Option<ClippedLine> {
    let mut kept: Vec<Fragment> =
        line.fragments.iter().filter(|f| retains(f, selection, config)).cloned().collect();
    if kept.iter().all(Fragment::is_blank) {
        return None;
    }
    kept.sort_by(|a, b| a.x.total_cmp(&b.x));

    let dominant = dominant_fragment(&kept)?;
    let dominant_font_name = dominant.raw_font_name.clone();
    let (bold, italic) = (dominant.bold, dominant.italic);
    let size = kept.iter().map(|f| f.size).fold(0.0, f32::max);

    Some(ClippedLine {
        baseline: line.baseline,
        bbox: fragments_bbox(&kept),
        text: join_fragments(&kept, config),
        dominant_font_name,
        size,
        bold,
        italic,
        fragments: kept,
    })
}

/// Clip every line, preserving top-to-bottom order
pub fn clip_lines(lines: &[Line], selection: &Rect, config: &ReconstructConfig) -> Vec<ClippedLine> {
    lines.iter().filter_map(|line| clip_line(line, selection, config)).collect()
}
