//! Turning blocks into editor items and the group that binds them

use crate::blocks::Block;
use doc_model::{Group, Item, TextContent};

/// One text item per block plus their enclosing group
///
/// Returns `None` when there is nothing to materialize.
pub fn materialize(blocks: &[Block], page: u32) -> Option<(Vec<Item>, Group)> {
    let items: Vec<Item> = blocks
        .iter()
        .map(|block| {
            Item::text(
                page,
                block.bbox.x,
                block.bbox.y,
                block.width,
                block.color,
                TextContent {
                    text: block.text.clone(),
                    font: block.style.face.clone(),
                    size: block.size,
                    line_height: block.line_height,
                    faux_bold: block.style.synthesize.faux_bold,
                    skew_degrees: block.style.synthesize.skew_degrees,
                    tracking: 0.0,
                },
            )
        })
        .collect();

    let group = Group::enclosing(page, &items)?;
    Some((items, group))
}
