//! Editor-side document model: geometry, editable items, groups, and the
//! session reducer every edit flows through.

pub mod export;
pub mod geometry;
pub mod item;
pub mod session;

pub use export::{export_edits, ExportEdit};
pub use geometry::{ColorParseError, Rect, Rgb};
pub use item::{Group, GroupChild, GroupId, Item, ItemId, ItemKind, TextContent};
pub use session::{
    apply_session_action, default_line_height, EditorSession, ItemPatch, Selection, SessionAction,
    TextStyle, ToolMode,
};
