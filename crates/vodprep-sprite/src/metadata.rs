//! The `sprite.json` descriptor.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name of the descriptor stored next to the sprite image.
pub const METADATA_FILE_NAME: &str = "sprite.json";

/// Descriptor format version written by this crate.
pub const METADATA_VERSION: u32 = 1;

/// Layout of a seek-thumbnail sprite.
///
/// Produced once per media asset by the offline sprite generator and consumed
/// read-only at playback time. Frame `i` occupies the cell at
/// `row = i / columns`, `col = i % columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteMetadata {
    /// Descriptor format version.
    pub version: u32,
    /// Width of one grid cell in pixels.
    pub thumbnail_width: u32,
    /// Height of one grid cell in pixels.
    pub thumbnail_height: u32,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Number of frames packed into the grid.
    pub count: u32,
    /// Seconds between consecutive captured frames.
    pub interval: f64,
    /// Seconds of source media covered by the sprite.
    pub duration: f64,
}

impl SpriteMetadata {
    /// Describe a grid holding `count` frames, with as many rows as needed.
    pub fn new_grid(
        thumbnail_width: u32,
        thumbnail_height: u32,
        columns: u32,
        count: u32,
        interval: f64,
        duration: f64,
    ) -> Self {
        let rows = if columns == 0 {
            0
        } else {
            count.div_ceil(columns)
        };

        Self {
            version: METADATA_VERSION,
            thumbnail_width,
            thumbnail_height,
            columns,
            rows,
            count,
            interval,
            duration,
        }
    }

    /// Parse a descriptor and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let meta: SpriteMetadata = serde_json::from_str(json)?;
        meta.validate()?;
        Ok(meta)
    }

    /// Serialize with two-space indentation, the on-disk form.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of cells in the grid.
    pub fn capacity(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    /// Width of the whole sprite image in pixels.
    pub fn sprite_width(&self) -> u32 {
        self.columns * self.thumbnail_width
    }

    /// Height of the whole sprite image in pixels.
    pub fn sprite_height(&self) -> u32 {
        self.rows * self.thumbnail_height
    }

    /// Check the constraints [`crate::locate`] relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMetadata`] naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err(Error::invalid_metadata(format!(
                "thumbnail size must be non-zero, got {}x{}",
                self.thumbnail_width, self.thumbnail_height
            )));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(Error::invalid_metadata(format!(
                "grid must have at least one row and column, got {}x{}",
                self.columns, self.rows
            )));
        }
        if self.count == 0 {
            return Err(Error::invalid_metadata("sprite contains no frames"));
        }
        if u64::from(self.count) > self.capacity() {
            return Err(Error::invalid_metadata(format!(
                "count {} exceeds grid capacity {}",
                self.count,
                self.capacity()
            )));
        }
        let full_width = u64::from(self.columns) * u64::from(self.thumbnail_width);
        let full_height = u64::from(self.rows) * u64::from(self.thumbnail_height);
        if full_width > u64::from(u32::MAX) || full_height > u64::from(u32::MAX) {
            return Err(Error::invalid_metadata(format!(
                "sprite size {}x{} exceeds {} pixels per side",
                full_width,
                full_height,
                u32::MAX
            )));
        }
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(Error::invalid_metadata(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(Error::invalid_metadata(format!(
                "duration must be a non-negative number of seconds, got {}",
                self.duration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpriteMetadata {
        SpriteMetadata::new_grid(160, 90, 10, 15, 1.0, 15.0)
    }

    #[test]
    fn test_new_grid_rounds_rows_up() {
        let meta = sample();
        assert_eq!(meta.rows, 2);
        assert_eq!(meta.version, METADATA_VERSION);
        assert_eq!(SpriteMetadata::new_grid(160, 90, 10, 20, 1.0, 20.0).rows, 2);
        assert_eq!(SpriteMetadata::new_grid(160, 90, 10, 21, 1.0, 21.0).rows, 3);
    }

    #[test]
    fn test_sprite_dimensions_ignore_count() {
        let mut meta = sample();
        assert_eq!((meta.sprite_width(), meta.sprite_height()), (1600, 180));
        meta.count = 11;
        assert_eq!((meta.sprite_width(), meta.sprite_height()), (1600, 180));
    }

    #[test]
    fn test_parse_generated_descriptor() {
        let json = r#"{
  "version": 1,
  "thumbnailWidth": 160,
  "thumbnailHeight": 90,
  "columns": 10,
  "rows": 2,
  "count": 15,
  "interval": 1,
  "duration": 15.015
}"#;
        let meta = SpriteMetadata::from_json(json).unwrap();
        assert_eq!(meta.count, 15);
        assert_eq!(meta.interval, 1.0);
        assert!((meta.duration - 15.015).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let json = sample().to_json_pretty().unwrap();
        assert!(json.contains("\"thumbnailWidth\": 160"));
        assert!(json.contains("\"thumbnailHeight\": 90"));
        assert!(!json.contains("thumbnail_width"));
        assert_eq!(SpriteMetadata::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn test_missing_field_is_json_error() {
        let err = SpriteMetadata::from_json(r#"{"version": 1}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_validate_rejects_degenerate_grids() {
        let mut meta = sample();
        meta.columns = 0;
        assert!(matches!(meta.validate(), Err(Error::InvalidMetadata(_))));

        let mut meta = sample();
        meta.count = 0;
        assert!(meta.validate().is_err());

        let mut meta = sample();
        meta.count = 21;
        let err = meta.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds grid capacity 20"));

        let mut meta = sample();
        meta.thumbnail_height = 0;
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_sprite() {
        let wide = r#"{"version":1,"thumbnailWidth":100000,"thumbnailHeight":90,
            "columns":100000,"rows":1,"count":1,"interval":1,"duration":1}"#;
        let err = SpriteMetadata::from_json(wide).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata(_)));
        assert!(err.to_string().contains("10000000000x90"));

        let mut tall = SpriteMetadata::new_grid(160, 70_000, 1, 70_000, 1.0, 70_000.0);
        assert!(tall.validate().is_err());
        tall.thumbnail_height = 60_000;
        assert!(tall.validate().is_ok());
        assert_eq!(tall.sprite_height(), 4_200_000_000);
    }

    #[test]
    fn test_validate_rejects_bad_timing() {
        let mut meta = sample();
        meta.interval = 0.0;
        assert!(meta.validate().is_err());

        meta.interval = f64::NAN;
        assert!(meta.validate().is_err());

        let mut meta = sample();
        meta.duration = -1.0;
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_full_grid() {
        let meta = SpriteMetadata::new_grid(160, 90, 10, 20, 0.5, 10.0);
        assert!(meta.validate().is_ok());
    }
}
