//! Font classification from raw font names
//!
//! A pure, table-driven approximation: the raw name (and any bold/italic
//! flags from extraction) map onto one of the twelve standard Latin faces.
//! No glyph metrics are compared; a face the export step cannot draw is
//! approximated with faux bold passes and a horizontal shear.

use crate::config::{SynthesisConfig, SynthesisPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    Times,
    Helvetica,
    Courier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slant {
    Upright,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Synthesis {
    /// Extra offset render passes, 0..=3
    pub faux_bold: u8,
    pub skew_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleGuess {
    pub family: Family,
    pub weight: Weight,
    pub slant: Slant,
    pub synthesize: Synthesis,
    /// Face the item is drawn with
    pub face: String,
}

impl StyleGuess {
    pub fn canonical_name(&self) -> &'static str {
        canonical_face(self.family, self.weight, self.slant)
    }
}

pub const STANDARD_FACES: [&str; 12] = [
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
];

const MAX_FAUX_BOLD: u8 = 3;

/// Lowercase name fragments and the family they imply, in priority order
const FAMILY_PATTERNS: &[(&str, Family)] = &[
    ("helv", Family::Helvetica),
    ("arial", Family::Helvetica),
    ("sans", Family::Helvetica),
    ("verdana", Family::Helvetica),
    ("tahoma", Family::Helvetica),
    ("calibri", Family::Helvetica),
    ("segoe", Family::Helvetica),
    ("roboto", Family::Helvetica),
    ("cour", Family::Courier),
    ("mono", Family::Courier),
    ("consol", Family::Courier),
    ("menlo", Family::Courier),
    ("fixed", Family::Courier),
];

const BOLD_TOKENS: &[&str] = &["bold", "semi", "demi", "medium"];
const OBLIQUE_TOKENS: &[&str] = &["ital", "obl"];

pub fn canonical_face(family: Family, weight: Weight, slant: Slant) -> &'static str {
    let index = match family {
        Family::Times => 0,
        Family::Helvetica => 4,
        Family::Courier => 8,
    } + match (weight, slant) {
        (Weight::Regular, Slant::Upright) => 0,
        (Weight::Bold, Slant::Upright) => 1,
        (Weight::Regular, Slant::Oblique) => 2,
        (Weight::Bold, Slant::Oblique) => 3,
    };
    STANDARD_FACES[index]
}

/// Drop a six-letter subset tag such as `ABCDEF+`
pub fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

pub fn classify(
    raw_font_name: &str,
    bold_flag: bool,
    italic_flag: bool,
    config: &SynthesisConfig,
) -> StyleGuess {
    let name = strip_subset_tag(raw_font_name).to_ascii_lowercase();

    let family = FAMILY_PATTERNS
        .iter()
        .find(|(token, _)| name.contains(token))
        .map(|(_, family)| *family)
        .unwrap_or(Family::Times);
    let weight = if bold_flag || BOLD_TOKENS.iter().any(|token| name.contains(token)) {
        Weight::Bold
    } else {
        Weight::Regular
    };
    let slant = if italic_flag || OBLIQUE_TOKENS.iter().any(|token| name.contains(token)) {
        Slant::Oblique
    } else {
        Slant::Upright
    };

    let wanted = canonical_face(family, weight, slant);
    let (face, synthesize_variant) = match config.policy {
        SynthesisPolicy::Always => (wanted, true),
        SynthesisPolicy::MissingVariantsOnly => {
            if config.available_faces.iter().any(|face| face == wanted) {
                (wanted, false)
            } else {
                (canonical_face(family, Weight::Regular, Slant::Upright), true)
            }
        }
    };

    let synthesize = if synthesize_variant {
        Synthesis {
            faux_bold: if weight == Weight::Bold { config.faux_bold.min(MAX_FAUX_BOLD) } else { 0 },
            skew_degrees: if slant == Slant::Oblique { config.skew_degrees } else { 0.0 },
        }
    } else {
        Synthesis::default()
    };

    StyleGuess { family, weight, slant, synthesize, face: face.to_owned() }
}
