//! Baseline clustering of fragments into text lines

use crate::config::ReconstructConfig;
use crate::normalize::Fragment;
use doc_model::Rect;

/// Fragments believed to share one baseline, ordered left to right
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Baseline of the fragment that opened the line
    pub baseline: f32,
    pub fragments: Vec<Fragment>,
    pub bbox: Rect,
    pub dominant_font_name: String,
    /// Largest member size
    pub size: f32,
}

impl Line {
    fn from_members(baseline: f32, mut fragments: Vec<Fragment>) -> Self {
        fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
        let bbox = fragments_bbox(&fragments);
        let dominant_font_name =
            dominant_fragment(&fragments).map(|f| f.raw_font_name.clone()).unwrap_or_default();
        let size = fragments.iter().map(|f| f.size).fold(0.0, f32::max);

        Self { baseline, fragments, bbox, dominant_font_name, size }
    }
}

/// Upper median of the fragment sizes, zero for no fragments
pub fn median_size(fragments: &[Fragment]) -> f32 {
    let mut sizes: Vec<f32> = fragments.iter().map(|f| f.size).collect();
    sizes.sort_by(f32::total_cmp);
    sizes.get(sizes.len() / 2).copied().unwrap_or(0.0)
}

/// Tight box around the fragments
///
/// Blank fragments only count when nothing else is present, so trailing
/// spaces never widen a line.
pub fn fragments_bbox(fragments: &[Fragment]) -> Rect {
    let inked: Vec<Rect> = fragments.iter().filter(|f| !f.is_blank()).map(Fragment::bbox).collect();
    let rects = if inked.is_empty() {
        fragments.iter().map(Fragment::bbox).collect()
    } else {
        inked
    };
    Rect::union_all(rects).unwrap_or_default()
}

/// First fragment carrying the font that covers the most characters
///
/// Ties go to the font seen first in left-to-right order.
pub fn dominant_fragment(fragments: &[Fragment]) -> Option<&Fragment> {
    let mut tally: Vec<(&str, usize, &Fragment)> = Vec::new();
    for fragment in fragments {
        let chars = fragment.text.chars().count();
        match tally.iter_mut().find(|(name, _, _)| *name == fragment.raw_font_name) {
            Some(entry) => entry.1 += chars,
            None => tally.push((&fragment.raw_font_name, chars, fragment)),
        }
    }

    let mut best: Option<(usize, &Fragment)> = None;
    for (_, chars, first) in tally {
        if best.map_or(true, |(count, _)| chars > count) {
            best = Some((chars, first));
        }
    }
    best.map(|(_, fragment)| fragment)
}

/// Nearest anchor within `limit`, earliest on ties
fn nearest_anchor(anchors: &[f32], baseline: f32, limit: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, anchor) in anchors.iter().enumerate() {
        let distance = (anchor - baseline).abs();
        if distance <= limit && best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Cluster a page's fragments into lines, top to bottom
pub fn assemble_lines(fragments: &[Fragment], config: &ReconstructConfig) -> Vec<Line> {
    let mut sorted = fragments.to_vec();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    let tolerance = config.line_tolerance(median_size(&sorted));
    let baselines: Vec<f32> = sorted.iter().map(|f| f.baseline(config)).collect();

    // Greedy pass: each line is anchored at the baseline of its first fragment.
    let anchors = baselines.iter().fold(Vec::<f32>::new(), |mut anchors, &baseline| {
        if nearest_anchor(&anchors, baseline, tolerance).is_none() {
            anchors.push(baseline);
        }
        anchors
    });

    // Settle pass: a later anchor may sit closer to an early fragment than the
    // line it joined greedily.
    let mut members: Vec<Vec<Fragment>> = vec![Vec::new(); anchors.len()];
    for (fragment, baseline) in sorted.into_iter().zip(baselines) {
        if let Some(index) = nearest_anchor(&anchors, baseline, f32::INFINITY) {
            members[index].push(fragment);
        }
    }

    let mut lines: Vec<Line> = anchors
        .into_iter()
        .zip(members)
        .filter(|(_, fragments)| !fragments.is_empty())
        .map(|(baseline, fragments)| Line::from_members(baseline, fragments))
        .collect();
    lines.sort_by(|a, b| a.baseline.total_cmp(&b.baseline));

    tracing::debug!(fragments = fragments.len(), lines = lines.len(), tolerance, "assembled lines");
    lines
}
