//! Mapping a playback position to a sprite grid cell.

use serde::Serialize;

use crate::SpriteMetadata;

/// Location and size of one grid cell within a sprite image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellAddress {
    /// Zero-based index of the captured frame.
    pub frame_index: u32,
    /// Grid row of the frame.
    pub row: u32,
    /// Grid column of the frame.
    pub column: u32,
    /// Horizontal pixel offset of the cell within the sprite.
    pub offset_x: u32,
    /// Vertical pixel offset of the cell within the sprite.
    pub offset_y: u32,
    /// Rendered width of the whole sprite.
    pub sprite_width: u32,
    /// Rendered height of the whole sprite.
    pub sprite_height: u32,
    /// Display width of the cell.
    pub cell_width: u32,
    /// Display height of the cell.
    pub cell_height: u32,
}

/// Find the grid cell previewing `time_secs`.
///
/// The time snaps to the nearest captured frame (`round(time / interval)`)
/// and positions past the last frame clamp to it. Negative or NaN times are
/// treated as zero.
///
/// `meta` must have passed [`SpriteMetadata::validate`]; a zero `interval`,
/// `count` or `columns` yields a meaningless address.
pub fn locate(time_secs: f64, meta: &SpriteMetadata) -> CellAddress {
    debug_assert!(meta.validate().is_ok(), "locate called with invalid metadata");

    let time_secs = if time_secs.is_nan() { 0.0 } else { time_secs.max(0.0) };
    let last = meta.count.saturating_sub(1);

    // float -> int casts saturate, so very large times land on `last`
    let nearest = (time_secs / meta.interval).round() as u64;
    let frame_index = nearest.min(u64::from(last)) as u32;

    let columns = meta.columns.max(1);
    let row = frame_index / columns;
    let column = frame_index % columns;

    CellAddress {
        frame_index,
        row,
        column,
        offset_x: column * meta.thumbnail_width,
        offset_y: row * meta.thumbnail_height,
        sprite_width: meta.sprite_width(),
        sprite_height: meta.sprite_height(),
        cell_width: meta.thumbnail_width,
        cell_height: meta.thumbnail_height,
    }
}
