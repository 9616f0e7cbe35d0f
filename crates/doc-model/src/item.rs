//! Editable items and the groups that bind them for joint manipulation.

use crate::geometry::{Rect, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Text payload of a `type: "text"` item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    /// Lines separated by `\n`
    pub text: String,

    /// Canonical face name (e.g. "Times-Roman", "Courier-BoldOblique")
    pub font: String,

    /// Font size in points
    pub size: f32,

    /// Baseline-to-baseline distance in points
    pub line_height: f32,

    /// Extra offset render passes used to thicken strokes (0..=3)
    pub faux_bold: u8,

    /// Horizontal shear in degrees used to simulate italics
    pub skew_degrees: f32,

    /// Extra advance per character in points
    pub tracking: f32,
}

impl TextContent {
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    Text(TextContent),
    Line { thickness: f32 },
}

/// An editable entity placed on a page
///
/// Position is the top-left corner in page points. The editor's session owns
/// every item; the clone pipeline only appends new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,

    /// 1-based page number
    pub page: u32,

    pub x: f32,
    pub y: f32,
    pub width: f32,

    #[serde(rename = "colorHex")]
    pub color: Rgb,

    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    pub fn text(page: u32, x: f32, y: f32, width: f32, color: Rgb, content: TextContent) -> Self {
        Self { id: ItemId::new(), page, x, y, width, color, kind: ItemKind::Text(content) }
    }

    pub fn line(page: u32, x: f32, y: f32, width: f32, thickness: f32, color: Rgb) -> Self {
        Self { id: ItemId::new(), page, x, y, width, color, kind: ItemKind::Line { thickness } }
    }

    pub fn as_text(&self) -> Option<&TextContent> {
        match &self.kind {
            ItemKind::Text(content) => Some(content),
            ItemKind::Line { .. } => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.kind {
            ItemKind::Text(content) => Some(content),
            ItemKind::Line { .. } => None,
        }
    }

    /// Extent the item covers once drawn
    ///
    /// Text spans `line_height` per line; a rule is as tall as it is thick.
    pub fn rendered_bounds(&self) -> Rect {
        let height = match &self.kind {
            ItemKind::Text(content) => content.line_height * content.line_count() as f32,
            ItemKind::Line { thickness } => *thickness,
        };
        Rect::new(self.x, self.y, self.width, height)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupChild {
    pub item_ref: ItemId,
}

/// Frame binding several items so they move, scale and delete together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub page: u32,
    pub bbox: Rect,
    pub children: Vec<GroupChild>,
}

impl Group {
    /// Wrap `items`, sizing the frame to the union of their rendered bounds
    ///
    /// Returns `None` for an empty slice; a group never starts childless.
    pub fn enclosing(page: u32, items: &[Item]) -> Option<Self> {
        let bbox = Rect::union_all(items.iter().map(Item::rendered_bounds))?;
        Some(Self {
            id: GroupId::new(),
            page,
            bbox,
            children: items.iter().map(|item| GroupChild { item_ref: item.id }).collect(),
        })
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.children.iter().any(|child| child.item_ref == item)
    }

    pub fn child_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.children.iter().map(|child| child.item_ref)
    }
}
