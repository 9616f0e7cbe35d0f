//! Page-space geometry and colors shared by the editor and the clone pipeline.
//!
//! All rectangles use the rendering surface convention: origin at the top-left
//! of the page, y growing downward, units in points (1/72 inch).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned rectangle in top-left page space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from edges, normalizing so `w` and `h` are never negative
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let (left, right) = if left <= right { (left, right) } else { (right, left) };
        let (top, bottom) = if top <= bottom { (top, bottom) } else { (bottom, top) };
        Self { x: left, y: top, w: right - left, h: bottom - top }
    }

    /// Same area with non-negative `w` and `h`, for rectangles dragged up or left
    pub fn normalized(&self) -> Rect {
        Rect::from_edges(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Union of every rectangle in the iterator, `None` when it is empty
    pub fn union_all<I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Rect>,
    {
        rects.into_iter().reduce(|acc, rect| acc.union(&rect))
    }

    /// Touch test with inclusive edges
    pub fn touches(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    /// Length of the shared x-interval (zero when disjoint)
    pub fn horizontal_overlap(&self, other: &Rect) -> f32 {
        (self.right().min(other.right()) - self.x.max(other.x)).max(0.0)
    }

    /// Length of the shared y-interval (zero when disjoint)
    pub fn vertical_overlap(&self, other: &Rect) -> f32 {
        (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0)
    }

    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x && x <= self.right()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Multiply every component by `factor` (point/pixel conversions)
    pub fn scaled(&self, factor: f32) -> Rect {
        Rect { x: self.x * factor, y: self.y * factor, w: self.w * factor, h: self.h * factor }
    }
}

/// Opaque sRGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Rec. 709 relative luminance on the 0..=255 scale
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled to 0.0..=1.0, the form the PDF writer consumes
    pub fn to_normalized(&self) -> [f32; 3] {
        [self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color {0:?}, expected #rrggbb")]
pub struct ColorParseError(pub String);

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorParseError(value.to_owned()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorParseError(value.to_owned()))
        };

        Ok(Rgb { r: channel(0..2)?, g: channel(2..4)?, b: channel(4..6)? })
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_rects() {
        let a = Rect::new(10.0, 10.0, 20.0, 5.0);
        let b = Rect::new(5.0, 30.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(5.0, 10.0, 25.0, 30.0));
    }

    #[test]
    fn union_all_of_nothing_is_none() {
        assert_eq!(Rect::union_all(Vec::new()), None);
    }

    #[test]
    fn from_edges_normalizes_reversed_drag() {
        let rect = Rect::from_edges(50.0, 40.0, 10.0, 20.0);
        assert_eq!(rect, Rect::new(10.0, 20.0, 40.0, 20.0));
    }

    #[test]
    fn normalized_flips_negative_extent() {
        let dragged = Rect::new(200.0, 110.0, -150.0, -40.0);
        assert_eq!(dragged.normalized(), Rect::new(50.0, 70.0, 150.0, 40.0));
        assert_eq!(dragged.normalized().normalized(), dragged.normalized());
    }

    #[test]
    fn overlaps_are_clamped_to_zero() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        assert_eq!(a.horizontal_overlap(&b), 0.0);
        assert_eq!(a.vertical_overlap(&b), 5.0);
        assert!(!a.touches(&b));
        assert!(a.touches(&Rect::new(10.0, 10.0, 1.0, 1.0)));
    }

    #[test]
    fn hex_parsing_accepts_with_and_without_hash() {
        assert_eq!("#1565c0".parse::<Rgb>().expect("valid"), Rgb::new(0x15, 0x65, 0xc0));
        assert_eq!("C62828".parse::<Rgb>().expect("valid"), Rgb::new(0xc6, 0x28, 0x28));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#zz0000".parse::<Rgb>().is_err());
    }

    #[test]
    fn color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 255)).expect("serialize");
        assert_eq!(json, "\"#0102ff\"");
        let back: Rgb = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Rgb::new(1, 2, 255));
    }

    #[test]
    fn luminance_weights_green_heaviest() {
        assert!(Rgb::new(0, 255, 0).luminance() > Rgb::new(255, 0, 0).luminance());
        assert!((Rgb::WHITE.luminance() - 255.0).abs() < 0.01);
    }
}
