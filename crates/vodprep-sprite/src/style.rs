//! CSS-style background crop for a located cell.

use std::fmt;

use serde::Serialize;

use crate::CellAddress;

/// Background properties that crop one cell out of a sprite image.
///
/// The sprite is scaled to its full rendered size and shifted by the negated
/// cell offset, so only the addressed cell shows through a box of the cell's
/// size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailStyle {
    pub background_image: String,
    pub background_position: String,
    pub background_size: String,
    pub width: String,
    pub height: String,
}

impl ThumbnailStyle {
    /// Build the style for `cell` of the sprite at `sprite_url`.
    pub fn new(sprite_url: &str, cell: &CellAddress) -> Self {
        Self {
            background_image: format!("url({})", sprite_url),
            background_position: format!("{} {}", negated_px(cell.offset_x), negated_px(cell.offset_y)),
            background_size: format!("{}px {}px", cell.sprite_width, cell.sprite_height),
            width: format!("{}px", cell.cell_width),
            height: format!("{}px", cell.cell_height),
        }
    }
}

fn negated_px(offset: u32) -> String {
    if offset == 0 {
        "0px".to_string()
    } else {
        format!("-{}px", offset)
    }
}

impl fmt::Display for ThumbnailStyle {
    /// Render as an inline style declaration.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "background-image: {}; background-position: {}; background-size: {}; width: {}; height: {};",
            self.background_image,
            self.background_position,
            self.background_size,
            self.width,
            self.height
        )
    }
}
