//! Area clone core
//!
//! Reconstructs editable text items from a rectangle on a rendered page:
//! glyph runs are normalized, clustered into lines, clipped to the
//! selection, classified, colored from the raster, coalesced into blocks
//! and finally materialized as a group of items in the editor session.

pub mod blocks;
pub mod clip;
pub mod color;
pub mod config;
pub mod eyedrop;
pub mod lines;
pub mod materialize;
pub mod normalize;
pub mod pipeline;
pub mod style;

pub use blocks::{coalesce, Block, StyledLine};
pub use clip::{clip_line, clip_lines, ClippedLine};
pub use color::{sample_grid, sample_point, sample_text_color, PixelSource};
pub use config::{ReconstructConfig, SampleMode, SamplerConfig, SynthesisConfig, SynthesisPolicy};
pub use eyedrop::StylePick;
pub use lines::{assemble_lines, Line};
pub use materialize::materialize;
pub use normalize::{normalize_run, normalize_runs, Fragment, Viewport};
pub use pipeline::{AreaCloner, CloneError, CloneOutcome, PageSnapshot, Reconstruction};
pub use style::{classify, canonical_face, Family, Slant, StyleGuess, Synthesis, Weight};
