//! Coalescing of compatible clipped lines into text blocks

use crate::clip::ClippedLine;
use crate::config::ReconstructConfig;
use crate::style::StyleGuess;
use doc_model::{Rect, Rgb};

/// A clipped line with its classified style and sampled color
#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    pub line: ClippedLine,
    pub style: StyleGuess,
    pub color: Rgb,
}

/// Run of lines sharing face, size and regular leading
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lines: Vec<StyledLine>,
    pub style: StyleGuess,
    /// Size of the first line; later lines stay within tolerance of it
    pub size: f32,
    /// Color of the first line
    pub color: Rgb,
    pub bbox: Rect,
    pub line_height: f32,
    pub width: f32,
    pub text: String,
}

impl Block {
    pub fn font(&self) -> &str {
        &self.style.face
    }

    fn finish(lines: Vec<StyledLine>, config: &ReconstructConfig) -> Option<Self> {
        let first = lines.first()?;
        let style = first.style.clone();
        let size = first.line.size;
        let color = first.color;

        let bbox = Rect::union_all(lines.iter().map(|l| l.line.bbox)).unwrap_or_default();
        let widest = lines.iter().map(|l| l.line.bbox.w).fold(0.0, f32::max);

        let mut gaps: Vec<f32> =
            lines.windows(2).map(|pair| pair[1].line.bbox.y - pair[0].line.bbox.y).collect();
        gaps.sort_by(f32::total_cmp);
        let line_height = match gaps.get(gaps.len() / 2) {
            Some(median) => median.round(),
            None => config.fallback_line_height(size),
        };

        let text = lines.iter().map(|l| l.line.text.as_str()).collect::<Vec<_>>().join("\n");

        Some(Self {
            style,
            size,
            color,
            bbox,
            line_height,
            width: widest.max(config.min_item_width),
            text,
            lines,
        })
    }
}

/// Whether `next` may extend a block anchored at `anchor` whose last line is `previous`
fn continues(
    anchor: &StyledLine,
    previous: &StyledLine,
    next: &StyledLine,
    config: &ReconstructConfig,
) -> bool {
    let anchor_size = anchor.line.size;
    let same_font = anchor.style.canonical_name() == next.style.canonical_name();
    let size_close = (next.line.size - anchor_size).abs() <= config.size_tolerance(anchor_size);
    let gap = next.line.bbox.y - previous.line.bbox.y;
    let gap_ok = gap <= config.gap_factor * config.expected_leading(anchor_size);

    same_font && size_close && gap_ok
}

/// Group top-to-bottom lines into blocks
pub fn coalesce(lines: Vec<StyledLine>, config: &ReconstructConfig) -> Vec<Block> {
    let mut runs: Vec<Vec<StyledLine>> = Vec::new();
    for line in lines {
        match runs.last_mut() {
            Some(current)
                if continues(&current[0], &current[current.len() - 1], &line, config) =>
            {
                current.push(line)
            }
            _ => runs.push(vec![line]),
        }
    }

    let blocks: Vec<Block> =
        runs.into_iter().filter_map(|run| Block::finish(run, config)).collect();
    tracing::debug!(blocks = blocks.len(), "coalesced lines");
    blocks
}
