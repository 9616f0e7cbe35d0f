//! End-to-end area clone: selection rectangle in, grouped text items out

use crate::blocks::{coalesce, Block, StyledLine};
use crate::clip::clip_lines;
use crate::color::{sample_text_color, PixelSource};
use crate::config::ReconstructConfig;
use crate::lines::assemble_lines;
use crate::materialize::materialize;
use crate::normalize::{normalize_runs, Viewport};
use crate::style::classify;
use doc_model::{apply_session_action, EditorSession, GroupId, ItemId, Rect, SessionAction};
use pdf_engine::{DocumentHandle, PdfEngine, PdfEngineError, RawTextRun, RenderRequest};
use std::fmt;

/// Everything the pipeline reads about one page
pub struct PageSnapshot<'a> {
    /// 1-based page number
    pub page: u32,
    pub height_pt: f32,
    pub runs: &'a [RawTextRun],
    pub pixels: &'a dyn PixelSource,
    pub viewport: Viewport,
}

/// Result of a reconstruction that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum CloneOutcome {
    Cloned { group: GroupId, items: Vec<ItemId> },
    /// No fragment touches the selection
    EmptySelection,
    /// Fragments touched the selection but none survived clipping
    NoSurvivingText,
    /// Marquee below the minimum pixel extent; nothing was extracted
    SelectionTooSmall,
}

impl CloneOutcome {
    pub fn is_cloned(&self) -> bool {
        matches!(self, CloneOutcome::Cloned { .. })
    }

    pub fn message(&self) -> String {
        match self {
            CloneOutcome::Cloned { items, .. } => format!("Cloned {} block(s).", items.len()),
            CloneOutcome::EmptySelection => "No text found in selection.".to_owned(),
            CloneOutcome::NoSurvivingText => "No text after clipping.".to_owned(),
            CloneOutcome::SelectionTooSmall => "Selection too small.".to_owned(),
        }
    }
}

impl fmt::Display for CloneOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Pure result of the reconstruction stages, before touching a session
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    Blocks(Vec<Block>),
    EmptySelection,
    NoSurvivingText,
}

#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error(transparent)]
    Engine(#[from] PdfEngineError),
}

#[derive(Debug, Clone, Default)]
pub struct AreaCloner {
    config: ReconstructConfig,
}

impl AreaCloner {
    pub fn new(config: ReconstructConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconstructConfig {
        &self.config
    }

    /// Run normalize → assemble → clip → classify → sample → coalesce
    pub fn reconstruct(&self, snapshot: &PageSnapshot<'_>, selection_pt: Rect) -> Reconstruction {
        let config = &self.config;
        let selection_pt = selection_pt.normalized();
        let fragments = normalize_runs(snapshot.runs, snapshot.height_pt, config);

        let touching = fragments.iter().filter(|f| f.bbox().touches(&selection_pt)).count();
        tracing::debug!(fragments = fragments.len(), touching, "normalized page runs");
        if touching == 0 {
            return Reconstruction::EmptySelection;
        }

        let lines = assemble_lines(&fragments, config);
        let clipped = clip_lines(&lines, &selection_pt, config);
        tracing::debug!(lines = lines.len(), clipped = clipped.len(), "clipped lines");
        if clipped.is_empty() {
            return Reconstruction::NoSurvivingText;
        }

        let styled: Vec<StyledLine> = clipped
            .into_iter()
            .map(|line| {
                let style =
                    classify(&line.dominant_font_name, line.bold, line.italic, &config.synthesis);
                let color = sample_text_color(
                    snapshot.pixels,
                    line.bbox,
                    snapshot.viewport,
                    &config.sampler,
                );
                StyledLine { line, style, color }
            })
            .collect();

        Reconstruction::Blocks(coalesce(styled, config))
    }

    /// Clone a selection given in page points into `session`
    ///
    /// Degenerate selections leave the session untouched.
    pub fn clone_area(
        &self,
        session: &mut EditorSession,
        snapshot: &PageSnapshot<'_>,
        selection_pt: Rect,
    ) -> CloneOutcome {
        let blocks = match self.reconstruct(snapshot, selection_pt) {
            Reconstruction::Blocks(blocks) => blocks,
            Reconstruction::EmptySelection => return CloneOutcome::EmptySelection,
            Reconstruction::NoSurvivingText => return CloneOutcome::NoSurvivingText,
        };

        let Some((items, group)) = materialize(&blocks, snapshot.page) else {
            return CloneOutcome::NoSurvivingText;
        };

        let outcome = CloneOutcome::Cloned {
            group: group.id,
            items: items.iter().map(|item| item.id).collect(),
        };
        apply_session_action(session, SessionAction::InsertClone { items, group });

        tracing::info!(page = snapshot.page, blocks = blocks.len(), "cloned selection");
        outcome
    }

    /// Clone a marquee given in rendered pixels
    ///
    /// The marquee may be dragged in any direction.
    pub fn clone_marquee(
        &self,
        session: &mut EditorSession,
        snapshot: &PageSnapshot<'_>,
        selection_px: Rect,
    ) -> CloneOutcome {
        let selection_px = selection_px.normalized();
        if self.is_too_small(selection_px) {
            return CloneOutcome::SelectionTooSmall;
        }
        self.clone_area(session, snapshot, snapshot.viewport.rect_to_points(selection_px))
    }

    /// Fetch page data from `engine` and clone a marquee on it
    ///
    /// `page_index` is 0-based; `scale` is the pixels-per-point of the raster
    /// the marquee was drawn on. Engine failures propagate unchanged.
    pub fn clone_from_engine<E>(
        &self,
        engine: &E,
        handle: DocumentHandle,
        session: &mut EditorSession,
        page_index: u32,
        scale: f32,
        selection_px: Rect,
    ) -> Result<CloneOutcome, CloneError>
    where
        E: PdfEngine + ?Sized,
    {
        if self.is_too_small(selection_px.normalized()) {
            return Ok(CloneOutcome::SelectionTooSmall);
        }

        let size = engine.page_size(handle, page_index)?;
        let runs = engine.text_runs(handle, page_index)?;
        let raster = engine.render_page(handle, RenderRequest { page_index, scale })?;

        let snapshot = PageSnapshot {
            page: page_index + 1,
            height_pt: size.height_pt,
            runs: &runs,
            pixels: &raster,
            viewport: Viewport::from_render_scale(scale),
        };
        Ok(self.clone_marquee(session, &snapshot, selection_px))
    }

    fn is_too_small(&self, selection_px: Rect) -> bool {
        selection_px.w < self.config.min_selection_px || selection_px.h < self.config.min_selection_px
    }
}
