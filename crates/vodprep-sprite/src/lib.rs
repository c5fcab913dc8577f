//! vodprep-sprite: seek-thumbnail sprite metadata and cell addressing
//!
//! A seek-thumbnail sprite is a single image made of a regular grid of small
//! frames captured at a fixed interval along the timeline. This crate owns the
//! descriptor stored next to the image (`sprite.json`) and the mapping from a
//! playback position to the grid cell that previews it.
//!
//! # Modules
//!
//! - `metadata` - The `sprite.json` descriptor and its validation
//! - `address` - Time to grid cell mapping ([`locate`])
//! - `style` - CSS-style background crop for a located cell
//!
//! # Example
//!
//! ```
//! use vodprep_sprite::{locate, SpriteMetadata};
//!
//! let meta = SpriteMetadata::new_grid(160, 90, 10, 15, 1.0, 15.0);
//! meta.validate()?;
//!
//! let cell = locate(1.6, &meta);
//! assert_eq!(cell.frame_index, 2);
//! assert_eq!((cell.offset_x, cell.offset_y), (320, 0));
//! # Ok::<(), vodprep_sprite::Error>(())
//! ```

pub mod address;
pub mod error;
pub mod metadata;
pub mod style;

pub use address::{locate, CellAddress};
pub use error::{Error, Result};
pub use metadata::{SpriteMetadata, METADATA_FILE_NAME, METADATA_VERSION};
pub use style::ThumbnailStyle;
