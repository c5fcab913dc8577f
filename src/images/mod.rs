//! Poster and thumbnail image conversion.
//!
//! Converts the JPEG artwork shipped with the site into width-capped AVIF
//! files next to the originals.

mod convert;

pub use convert::{
    convert_dir, convert_to_avif, find_jpegs, target_size, AvifSettings, ConversionSummary,
    ConvertedImage,
};
