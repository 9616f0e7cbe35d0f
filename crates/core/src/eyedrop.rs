//! Picking a text style from existing page content

use crate::color::sample_point;
use crate::normalize::{normalize_runs, Fragment};
use crate::pipeline::{AreaCloner, PageSnapshot};
use crate::style::{classify, StyleGuess};
use doc_model::{apply_session_action, EditorSession, Rgb, SessionAction, TextStyle, ToolMode};

/// Vertical position of a glyph's visual center as a fraction of its size
const VISUAL_CENTER_RATIO: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct StylePick {
    pub style: StyleGuess,
    /// Rounded size, never below the configured floor
    pub size: f32,
    pub color: Rgb,
    /// Text of the fragment the style came from
    pub source_text: String,
}

impl StylePick {
    pub fn text_style(&self) -> TextStyle {
        TextStyle { font: self.style.face.clone(), size: self.size, color: self.color }
    }
}

fn visual_center(fragment: &Fragment) -> (f32, f32) {
    (fragment.center_x(), fragment.y + fragment.size * VISUAL_CENTER_RATIO)
}

impl AreaCloner {
    /// Style of the fragment whose visual center is nearest `(x_pt, y_pt)`
    pub fn pick_style(&self, snapshot: &PageSnapshot<'_>, x_pt: f32, y_pt: f32) -> Option<StylePick> {
        let config = self.config();
        let fragments = normalize_runs(snapshot.runs, snapshot.height_pt, config);

        let nearest = fragments
            .iter()
            .filter(|fragment| !fragment.is_blank())
            .map(|fragment| {
                let (cx, cy) = visual_center(fragment);
                let distance = (cx - x_pt).powi(2) + (cy - y_pt).powi(2);
                (fragment, distance)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(fragment, _)| fragment)?;

        let (cx, cy) = visual_center(nearest);
        let (px, py) = snapshot.viewport.point_to_pixels(cx, cy);

        Some(StylePick {
            style: classify(
                &nearest.raw_font_name,
                nearest.bold,
                nearest.italic,
                &config.synthesis,
            ),
            size: nearest.size.round().max(config.eyedrop_min_size),
            color: sample_point(snapshot.pixels, px, py, &config.sampler),
            source_text: nearest.text.clone(),
        })
    }

    /// Pick a style and make it the session's style for new text
    ///
    /// The tool falls back to placement either way.
    pub fn eyedrop(
        &self,
        session: &mut EditorSession,
        snapshot: &PageSnapshot<'_>,
        x_pt: f32,
        y_pt: f32,
    ) -> Option<StylePick> {
        let pick = self.pick_style(snapshot, x_pt, y_pt);
        if let Some(pick) = &pick {
            apply_session_action(session, SessionAction::SetTextStyle { style: pick.text_style() });
            tracing::debug!(font = %pick.style.face, size = pick.size, color = %pick.color, "picked style");
        }
        apply_session_action(session, SessionAction::SetTool { tool: ToolMode::Place });
        pick
    }
}
