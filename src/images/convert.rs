//! JPEG to AVIF conversion with width capping.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::codecs::avif::AvifEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use walkdir::WalkDir;

use crate::config::ImagesConfig;

/// Source extension picked up by [`find_jpegs`], compared case-insensitively.
const SOURCE_EXTENSION: &str = "jpeg";

/// AVIF encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvifSettings {
    /// Images wider than this are scaled down; narrower ones are left alone.
    pub max_width: u32,
    /// Encoder quality, 1-100.
    pub quality: u8,
    /// Encoder speed, 1-10 (10 is fastest).
    pub speed: u8,
}

impl Default for AvifSettings {
    fn default() -> Self {
        Self {
            max_width: 400,
            quality: 30,
            speed: 6,
        }
    }
}

impl From<&ImagesConfig> for AvifSettings {
    fn from(config: &ImagesConfig) -> Self {
        Self {
            max_width: config.max_width,
            quality: config.quality,
            speed: config.speed,
        }
    }
}

/// A file written by [`convert_to_avif`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Result of converting a directory.
#[derive(Debug, Default)]
pub struct ConversionSummary {
    pub converted: Vec<ConvertedImage>,
    /// Sources that could not be converted, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Find `.jpeg` files in `dir`, sorted by path.
///
/// Only direct children are returned unless `recursive` is set.
pub fn find_jpegs(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        if entry.file_type().is_file() && has_source_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Dimensions after fitting `width x height` inside `max_width` without
/// enlarging. The aspect ratio is kept and the height never rounds to zero.
pub fn target_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }

    let scaled = (u64::from(height) * u64::from(max_width) + u64::from(width) / 2) / u64::from(width);
    (max_width, (scaled as u32).max(1))
}

/// Convert one image to `<stem>.avif` beside it.
pub fn convert_to_avif(source: &Path, settings: &AvifSettings) -> Result<ConvertedImage> {
    let img = image::open(source)
        .with_context(|| format!("Failed to decode image: {}", source.display()))?;

    let (width, height) = target_size(img.width(), img.height(), settings.max_width);
    let img = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let output = source.with_extension("avif");
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let encoder = AvifEncoder::new_with_speed_quality(&mut writer, settings.speed, settings.quality);
    if let Err(e) = img.write_with_encoder(encoder) {
        drop(writer);
        let _ = std::fs::remove_file(&output);
        return Err(e).with_context(|| format!("Failed to encode {}", output.display()));
    }

    Ok(ConvertedImage {
        source: source.to_path_buf(),
        output,
        width,
        height,
    })
}

/// Convert every `.jpeg` under `dir`.
///
/// A file that fails to convert is logged and recorded; the rest still run.
pub fn convert_dir(dir: &Path, recursive: bool, settings: &AvifSettings) -> Result<ConversionSummary> {
    let sources = find_jpegs(dir, recursive)?;
    tracing::info!("Converting {} JPEG files in {}", sources.len(), dir.display());

    let mut summary = ConversionSummary::default();
    for source in sources {
        match convert_to_avif(&source, settings) {
            Ok(converted) => {
                tracing::info!(
                    "Converted {} to {} ({}x{})",
                    source.display(),
                    converted.output.display(),
                    converted.width,
                    converted.height
                );
                summary.converted.push(converted);
            }
            Err(e) => {
                tracing::error!("Failed to convert {}: {:#}", source.display(), e);
                summary.failed.push((source, format!("{:#}", e)));
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let mut img = RgbImage::new(width, height);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 4) as u8, 120, 200]);
        }
        DynamicImage::ImageRgb8(img)
            .save_with_format(path, ImageFormat::Jpeg)
            .unwrap();
    }

    #[test]
    fn test_target_size_never_enlarges() {
        assert_eq!(target_size(300, 200, 400), (300, 200));
        assert_eq!(target_size(400, 225, 400), (400, 225));
    }

    #[test]
    fn test_target_size_keeps_aspect() {
        assert_eq!(target_size(1920, 1080, 400), (400, 225));
        assert_eq!(target_size(1000, 333, 400), (400, 133));
        assert_eq!(target_size(4000, 1, 400), (400, 1));
    }

    #[test]
    fn test_find_jpegs_case_insensitive_and_shallow() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpeg"), b"").unwrap();
        std::fs::write(dir.path().join("A.JPEG"), b"").unwrap();
        std::fs::write(dir.path().join("c.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("d.avif"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/e.jpeg"), b"").unwrap();

        let names = |files: Vec<PathBuf>| -> Vec<String> {
            files
                .iter()
                .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
                .collect()
        };

        let shallow = find_jpegs(dir.path(), false).unwrap();
        assert_eq!(names(shallow), ["A.JPEG", "b.jpeg"]);

        let deep = find_jpegs(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_convert_downscales_wide_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("poster.jpeg");
        write_jpeg(&source, 64, 36);

        let settings = AvifSettings {
            max_width: 32,
            quality: 30,
            speed: 10,
        };
        let converted = convert_to_avif(&source, &settings).unwrap();

        assert_eq!(converted.output, dir.path().join("poster.avif"));
        assert_eq!((converted.width, converted.height), (32, 18));
        assert!(std::fs::metadata(&converted.output).unwrap().len() > 0);
        assert!(source.exists());
    }

    #[test]
    fn test_convert_dir_records_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(&dir.path().join("good.jpeg"), 16, 16);
        std::fs::write(dir.path().join("broken.jpeg"), b"not a jpeg").unwrap();

        let settings = AvifSettings {
            speed: 10,
            ..AvifSettings::default()
        };
        let summary = convert_dir(dir.path(), false, &settings).unwrap();

        assert_eq!(summary.converted.len(), 1);
        assert_eq!((summary.converted[0].width, summary.converted[0].height), (16, 16));
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("broken.jpeg"));
        assert!(!dir.path().join("broken.avif").exists());
    }
}
