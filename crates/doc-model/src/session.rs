//! Editor session state and the reducer that mutates it.
//!
//! The session is an explicit value handed to whoever needs to change it;
//! every change goes through [`apply_session_action`].

use crate::geometry::{Rect, Rgb};
use crate::item::{Group, GroupId, Item, ItemId, ItemKind, TextContent};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_WIDTH: f32 = 460.0;
pub const DEFAULT_RULE_THICKNESS: f32 = 2.0;
pub const LINE_HEIGHT_RATIO: f32 = 1.35;

const MIN_SCALED_SIZE: f32 = 5.0;
const MIN_SCALED_LINE_HEIGHT: f32 = 6.0;
const MIN_SCALED_THICKNESS: f32 = 0.5;
const MAX_FAUX_BOLD: u8 = 3;

/// Fallback line height for text of `size` points
pub fn default_line_height(size: f32) -> f32 {
    (size * LINE_HEIGHT_RATIO).round()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Selection {
    Item(ItemId),
    Group(GroupId),
}

/// What a primary click on the page does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    /// Click sets the placement point for new items
    #[default]
    Place,
    /// Click picks font, size and color from the nearest text
    Eyedrop,
    /// Drag selects an area to clone
    AreaClone,
}

/// Style applied to newly placed text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: String,
    pub size: f32,
    pub color: Rgb,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { font: "Times-Roman".to_owned(), size: 11.0, color: Rgb::BLACK }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSession {
    pub items: Vec<Item>,
    pub groups: Vec<Group>,
    pub selection: Option<Selection>,
    pub tool: ToolMode,
    /// 1-based page currently shown
    pub current_page: u32,
    pub text_style: TextStyle,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            groups: Vec::new(),
            selection: None,
            tool: ToolMode::default(),
            current_page: 1,
            text_style: TextStyle::default(),
        }
    }
}

impl EditorSession {
    pub fn apply(&mut self, action: SessionAction) {
        apply_session_action(self, action);
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    fn refresh_group_bounds(&mut self, group_index: usize) {
        let Some(group) = self.groups.get(group_index) else {
            return;
        };
        let bounds = Rect::union_all(
            group
                .child_ids()
                .filter_map(|id| self.item(id))
                .map(Item::rendered_bounds)
                .collect::<Vec<_>>(),
        );
        if let Some(bounds) = bounds {
            self.groups[group_index].bbox = bounds;
        }
    }

    fn refresh_groups_containing(&mut self, item: ItemId) {
        let indices: Vec<usize> = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group.contains(item))
            .map(|(index, _)| index)
            .collect();
        for index in indices {
            self.refresh_group_bounds(index);
        }
    }

    /// Remove items and detach them from every group; drop groups left empty
    fn remove_items(&mut self, ids: &[ItemId]) {
        self.items.retain(|item| !ids.contains(&item.id));
        for group in &mut self.groups {
            group.children.retain(|child| !ids.contains(&child.item_ref));
        }

        let before: Vec<GroupId> = self.groups.iter().map(|group| group.id).collect();
        self.groups.retain(|group| !group.children.is_empty());

        for index in 0..self.groups.len() {
            self.refresh_group_bounds(index);
        }

        self.selection = match self.selection {
            Some(Selection::Item(id)) if ids.contains(&id) => None,
            Some(Selection::Group(id))
                if before.contains(&id) && self.group(id).is_none() =>
            {
                None
            }
            other => other,
        };
    }
}

/// Field edits for one item; `None` leaves a field unchanged
///
/// Text-only fields are ignored on rules and `thickness` is ignored on text.
/// Non-positive sizes, widths, line heights and thicknesses are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub font: Option<String>,
    pub size: Option<f32>,
    pub color: Option<Rgb>,
    pub width: Option<f32>,
    pub line_height: Option<f32>,
    pub faux_bold: Option<u8>,
    pub skew_degrees: Option<f32>,
    pub tracking: Option<f32>,
    pub thickness: Option<f32>,
}

impl ItemPatch {
    fn apply_to(self, item: &mut Item) {
        let positive = |value: Option<f32>| value.filter(|v| *v > 0.0);

        if let Some(color) = self.color {
            item.color = color;
        }
        if let Some(width) = positive(self.width) {
            item.width = width;
        }

        match &mut item.kind {
            ItemKind::Text(content) => {
                if let Some(font) = self.font.filter(|font| !font.is_empty()) {
                    content.font = font;
                }
                if let Some(size) = positive(self.size) {
                    content.size = size;
                }
                if let Some(line_height) = positive(self.line_height) {
                    content.line_height = line_height;
                }
                if let Some(faux_bold) = self.faux_bold {
                    content.faux_bold = faux_bold.min(MAX_FAUX_BOLD);
                }
                if let Some(skew) = self.skew_degrees {
                    content.skew_degrees = skew;
                }
                if let Some(tracking) = self.tracking {
                    content.tracking = tracking;
                }
            }
            ItemKind::Line { thickness } => {
                if let Some(value) = positive(self.thickness) {
                    *thickness = value;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Append the output of one area clone and select its group
    InsertClone { items: Vec<Item>, group: Group },
    AddText { page: u32, x: f32, y: f32, text: String },
    AddLine { page: u32, x: f32, y: f32, width: f32 },
    Select { target: Option<Selection> },
    SetTool { tool: ToolMode },
    SetCurrentPage { page: u32 },
    SetTextStyle { style: TextStyle },
    ReplaceText { item: ItemId, text: String },
    /// Restyle a single item in place
    RestyleItem { item: ItemId, patch: ItemPatch },
    MoveItem { item: ItemId, dx: f32, dy: f32 },
    MoveGroup { group: GroupId, dx: f32, dy: f32 },
    /// Fit the group and its children into `bounds`
    ScaleGroup { group: GroupId, bounds: Rect },
    /// Remove the group frame; children survive
    Ungroup { group: GroupId },
    DeleteItem { item: ItemId },
    /// Remove the group together with its children
    DeleteGroup { group: GroupId },
    DeleteSelection,
    Clear,
}

pub fn apply_session_action(session: &mut EditorSession, action: SessionAction) {
    match action {
        SessionAction::InsertClone { items, group } => {
            session.selection = Some(Selection::Group(group.id));
            session.items.extend(items);
            session.groups.push(group);
        }
        SessionAction::AddText { page, x, y, text } => {
            let style = session.text_style.clone();
            let item = Item::text(
                page,
                x,
                y,
                DEFAULT_TEXT_WIDTH,
                style.color,
                TextContent {
                    text,
                    font: style.font,
                    size: style.size,
                    line_height: default_line_height(style.size),
                    faux_bold: 0,
                    skew_degrees: 0.0,
                    tracking: 0.0,
                },
            );
            session.selection = Some(Selection::Item(item.id));
            session.items.push(item);
        }
        SessionAction::AddLine { page, x, y, width } => {
            let item =
                Item::line(page, x, y, width, DEFAULT_RULE_THICKNESS, session.text_style.color);
            session.selection = Some(Selection::Item(item.id));
            session.items.push(item);
        }
        SessionAction::Select { target } => {
            session.selection = target.filter(|target| match target {
                Selection::Item(id) => session.item(*id).is_some(),
                Selection::Group(id) => session.group(*id).is_some(),
            });
        }
        SessionAction::SetTool { tool } => session.tool = tool,
        SessionAction::SetCurrentPage { page } => session.current_page = page.max(1),
        SessionAction::SetTextStyle { style } => session.text_style = style,
        SessionAction::ReplaceText { item, text } => {
            if let Some(content) = session.item_mut(item).and_then(Item::as_text_mut) {
                content.text = text;
                session.refresh_groups_containing(item);
            }
        }
        SessionAction::RestyleItem { item, patch } => {
            if let Some(target) = session.item_mut(item) {
                patch.apply_to(target);
                session.refresh_groups_containing(item);
            }
        }
        SessionAction::MoveItem { item, dx, dy } => {
            if let Some(target) = session.item_mut(item) {
                target.translate(dx, dy);
                session.refresh_groups_containing(item);
            }
        }
        SessionAction::MoveGroup { group, dx, dy } => {
            let Some(index) = session.groups.iter().position(|g| g.id == group) else {
                return;
            };
            let children: Vec<ItemId> = session.groups[index].child_ids().collect();
            for item in session.items.iter_mut().filter(|item| children.contains(&item.id)) {
                item.translate(dx, dy);
            }
            let frame = &mut session.groups[index];
            frame.bbox = frame.bbox.translated(dx, dy);
        }
        SessionAction::ScaleGroup { group, bounds } => scale_group(session, group, bounds),
        SessionAction::Ungroup { group } => {
            session.groups.retain(|g| g.id != group);
            if session.selection == Some(Selection::Group(group)) {
                session.selection = None;
            }
        }
        SessionAction::DeleteItem { item } => session.remove_items(&[item]),
        SessionAction::DeleteGroup { group } => {
            let Some(frame) = session.group(group) else {
                return;
            };
            let children: Vec<ItemId> = frame.child_ids().collect();
            session.groups.retain(|g| g.id != group);
            if session.selection == Some(Selection::Group(group)) {
                session.selection = None;
            }
            session.remove_items(&children);
        }
        SessionAction::DeleteSelection => match session.selection {
            Some(Selection::Item(item)) => {
                apply_session_action(session, SessionAction::DeleteItem { item })
            }
            Some(Selection::Group(group)) => {
                apply_session_action(session, SessionAction::DeleteGroup { group })
            }
            None => {}
        },
        SessionAction::Clear => {
            session.items.clear();
            session.groups.clear();
            session.selection = None;
        }
    }
}

fn scale_group(session: &mut EditorSession, group: GroupId, bounds: Rect) {
    let Some(index) = session.groups.iter().position(|g| g.id == group) else {
        return;
    };
    let old = session.groups[index].bbox;
    if old.w <= 0.0 || old.h <= 0.0 || bounds.w <= 0.0 || bounds.h <= 0.0 {
        return;
    }

    let sx = bounds.w / old.w;
    let sy = bounds.h / old.h;
    let mean = (sx + sy) / 2.0;
    let children: Vec<ItemId> = session.groups[index].child_ids().collect();

    for item in session.items.iter_mut().filter(|item| children.contains(&item.id)) {
        item.x = bounds.x + (item.x - old.x) * sx;
        item.y = bounds.y + (item.y - old.y) * sy;
        item.width *= sx;
        match &mut item.kind {
            ItemKind::Text(content) => {
                content.size = (content.size * mean).max(MIN_SCALED_SIZE);
                content.line_height = (content.line_height * mean).max(MIN_SCALED_LINE_HEIGHT);
                content.tracking *= mean;
            }
            ItemKind::Line { thickness } => {
                *thickness = (*thickness * mean).max(MIN_SCALED_THICKNESS);
            }
        }
    }

    session.refresh_group_bounds(index);
}
