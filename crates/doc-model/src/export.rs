//! Flat edit records handed to the PDF writer at export time.

use crate::item::ItemKind;
use crate::session::{default_line_height, EditorSession};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportEdit {
    #[serde(rename_all = "camelCase")]
    Text {
        page: u32,
        x: f32,
        y: f32,
        width: f32,
        text: String,
        font: String,
        size: f32,
        /// RGB channels in 0.0..=1.0
        color: [f32; 3],
        line_height: f32,
        faux_bold: u8,
        skew_degrees: f32,
        tracking: f32,
    },
    Line {
        page: u32,
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        color: [f32; 3],
    },
}

/// Every item in the session, in insertion order
///
/// Groups are an editing aid only and do not appear in the output.
pub fn export_edits(session: &EditorSession) -> Vec<ExportEdit> {
    session
        .items
        .iter()
        .map(|item| match &item.kind {
            ItemKind::Text(content) => ExportEdit::Text {
                page: item.page,
                x: item.x,
                y: item.y,
                width: item.width,
                text: content.text.clone(),
                font: content.font.clone(),
                size: content.size,
                color: item.color.to_normalized(),
                line_height: if content.line_height > 0.0 {
                    content.line_height
                } else {
                    default_line_height(content.size)
                },
                faux_bold: content.faux_bold,
                skew_degrees: content.skew_degrees,
                tracking: content.tracking,
            },
            ItemKind::Line { thickness } => ExportEdit::Line {
                page: item.page,
                x: item.x,
                y: item.y,
                width: item.width,
                thickness: *thickness,
                color: item.color.to_normalized(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rgb;
    use crate::item::{Item, TextContent};

    #[test]
    fn export_keeps_order_and_normalizes_color() {
        let mut session = EditorSession::default();
        session.items.push(Item::line(1, 0.0, 0.0, 100.0, 2.0, Rgb::WHITE));
        session.items.push(Item::text(
            2,
            5.0,
            6.0,
            50.0,
            Rgb::new(255, 0, 0),
            TextContent {
                text: "Total".to_owned(),
                font: "Helvetica-Bold".to_owned(),
                size: 20.0,
                line_height: 0.0,
                faux_bold: 1,
                skew_degrees: 0.0,
                tracking: 0.0,
            },
        ));

        let edits = export_edits(&session);
        assert_eq!(edits.len(), 2);
        assert!(matches!(edits[0], ExportEdit::Line { thickness, .. } if thickness == 2.0));
        match &edits[1] {
            ExportEdit::Text { color, line_height, font, .. } => {
                assert_eq!(*color, [1.0, 0.0, 0.0]);
                assert_eq!(*line_height, 27.0);
                assert_eq!(font, "Helvetica-Bold");
            }
            other => panic!("expected text edit, got {other:?}"),
        }
    }

    #[test]
    fn text_edit_uses_camel_case_keys() {
        let mut session = EditorSession::default();
        session.items.push(Item::text(
            1,
            0.0,
            0.0,
            10.0,
            Rgb::BLACK,
            TextContent {
                text: "x".to_owned(),
                font: "Courier".to_owned(),
                size: 10.0,
                line_height: 14.0,
                faux_bold: 0,
                skew_degrees: 12.0,
                tracking: 0.0,
            },
        ));

        let value = serde_json::to_value(export_edits(&session)).expect("serialize");
        assert_eq!(value[0]["type"], "text");
        assert_eq!(value[0]["skewDegrees"], serde_json::json!(12.0));
        assert_eq!(value[0]["lineHeight"], serde_json::json!(14.0));
    }
}
