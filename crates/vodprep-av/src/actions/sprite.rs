//! Seek-thumbnail sprite generation.
//!
//! Concatenates every segment of a stream, samples one frame per interval,
//! scales the samples to the cell size and tiles them into a single image
//! next to a `sprite.json` descriptor.

use super::run_ffmpeg;
use crate::probe::total_duration;
use crate::{Error, Result, Toolchain, Workspace};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use vodprep_sprite::{SpriteMetadata, METADATA_FILE_NAME};

/// Image format of the composited sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteFormat {
    /// AV1 still image via libaom
    #[default]
    Avif,
    /// JPEG, for ffmpeg builds without an AV1 encoder
    Jpeg,
}

impl SpriteFormat {
    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            SpriteFormat::Avif => "avif",
            SpriteFormat::Jpeg => "jpg",
        }
    }

    /// Get the ffmpeg encoder this format needs.
    pub fn encoder(&self) -> &'static str {
        match self {
            SpriteFormat::Avif => "libaom-av1",
            SpriteFormat::Jpeg => "mjpeg",
        }
    }

    /// File name of the sprite image.
    pub fn file_name(&self) -> String {
        format!("sprite.{}", self.extension())
    }
}

impl std::str::FromStr for SpriteFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "avif" => Ok(SpriteFormat::Avif),
            "jpeg" | "jpg" => Ok(SpriteFormat::Jpeg),
            _ => Err(format!("Unknown sprite format: {}", s)),
        }
    }
}

/// Sprite layout and encoder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteOptions {
    /// Seconds between sampled frames.
    pub interval: f64,
    /// Cell width in pixels.
    pub thumbnail_width: u32,
    /// Cell height in pixels.
    pub thumbnail_height: u32,
    /// Grid columns.
    pub columns: u32,
    /// Upper bound on sampled frames.
    pub max_thumbnails: u32,
    /// Output image format.
    pub format: SpriteFormat,
    /// Frame rate the sampling step is computed against.
    pub source_frame_rate: u32,
    /// libaom CRF (0-63, lower is better).
    pub crf: u8,
    /// libaom speed (0-8, higher is faster).
    pub cpu_used: u8,
    /// JPEG `-q:v` (2-31, lower is better).
    pub jpeg_quality: u8,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            interval: 1.0,
            thumbnail_width: 160,
            thumbnail_height: 90,
            columns: 10,
            max_thumbnails: 300,
            format: SpriteFormat::Avif,
            source_frame_rate: 30,
            crf: 30,
            cpu_used: 4,
            jpeg_quality: 5,
        }
    }
}

impl SpriteOptions {
    fn validate(&self) -> Result<()> {
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Sprite interval must be positive, got {}",
                self.interval
            )));
        }
        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err(Error::InvalidInput(
                "Thumbnail dimensions must be non-zero".to_string(),
            ));
        }
        if self.columns == 0 || self.max_thumbnails == 0 || self.source_frame_rate == 0 {
            return Err(Error::InvalidInput(
                "Columns, max thumbnails and source frame rate must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Frames between two samples at the source frame rate.
    fn frame_step(&self) -> u64 {
        ((self.interval * f64::from(self.source_frame_rate)).round() as u64).max(1)
    }
}

/// Files written by [`generate_sprite`].
#[derive(Debug, Clone)]
pub struct SpriteOutput {
    /// Path of the composited image.
    pub sprite_path: PathBuf,
    /// Path of the `sprite.json` descriptor.
    pub metadata_path: PathBuf,
    /// The descriptor that was written.
    pub metadata: SpriteMetadata,
}

/// Compute the grid for a stream of `total_duration` seconds.
///
/// One frame per interval, capped at `max_thumbnails`, with as many rows as
/// the frames need.
pub fn plan_grid(total_duration: f64, options: &SpriteOptions) -> Result<SpriteMetadata> {
    options.validate()?;

    if !total_duration.is_finite() || total_duration <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Cannot build a sprite for a stream of {} seconds",
            total_duration
        )));
    }

    let wanted = (total_duration / options.interval).ceil() as u64;
    let count = wanted.min(u64::from(options.max_thumbnails)) as u32;

    let meta = SpriteMetadata::new_grid(
        options.thumbnail_width,
        options.thumbnail_height,
        options.columns,
        count,
        options.interval,
        total_duration,
    );
    meta.validate()?;
    Ok(meta)
}

/// Generate `sprite.<ext>` and `sprite.json` for the segments in `dir`.
///
/// # Errors
///
/// - [`Error::NoSegments`] if `dir` holds no `.ts` files.
/// - [`Error::InvalidInput`] if the options are degenerate or the segments
///   report no duration.
/// - [`Error::ToolNotFound`] / [`Error::ToolFailed`] for ffmpeg/ffprobe
///   problems.
pub fn generate_sprite(tools: &Toolchain, dir: &Path, options: &SpriteOptions) -> Result<SpriteOutput> {
    options.validate()?;
    let workspace = Workspace::new(dir)?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Generating {:?} sprite for {} segments in {:?}",
        options.format,
        workspace.segments().len(),
        dir
    );

    let duration = total_duration(&tools.ffprobe, workspace.segments())?;

    #[cfg(feature = "tracing")]
    tracing::info!("Total duration: {:.2} seconds", duration);

    let metadata = plan_grid(duration, options)?;

    let list_path = workspace.temp_file("concat_list.txt");
    std::fs::write(&list_path, concat_list(workspace.segments()))?;

    let file_name = options.format.file_name();
    let staged = workspace.temp_file(&file_name);
    let args = ffmpeg_args(&list_path, &staged, &metadata, options);
    run_ffmpeg(&tools.ffmpeg, &args)?;

    let sprite_path = workspace.output_file(&file_name);
    workspace.replace(&staged, &sprite_path)?;

    let metadata_path = workspace.output_file(METADATA_FILE_NAME);
    std::fs::write(&metadata_path, metadata.to_json_pretty()?)?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Sprite written to {:?} ({} frames, {}x{} grid)",
        sprite_path,
        metadata.count,
        metadata.columns,
        metadata.rows
    );

    Ok(SpriteOutput {
        sprite_path,
        metadata_path,
        metadata,
    })
}

/// Build an ffconcat list naming every segment.
fn concat_list(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|p| {
            let path = std::path::absolute(p).unwrap_or_else(|_| p.clone());
            format!("file '{}'", path.to_string_lossy().replace('\'', r"'\''"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn video_filter(meta: &SpriteMetadata, options: &SpriteOptions) -> String {
    format!(
        "select='not(mod(n,{}))',setpts=N/FRAME_RATE/TB,scale={}:{},tile={}x{}",
        options.frame_step(),
        meta.thumbnail_width,
        meta.thumbnail_height,
        meta.columns,
        meta.rows
    )
}

fn ffmpeg_args(
    list_path: &Path,
    output: &Path,
    meta: &SpriteMetadata,
    options: &SpriteOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(list_path.into());
    args.push("-vf".into());
    args.push(video_filter(meta, options).into());
    args.extend(["-frames:v", "1"].map(OsString::from));

    match options.format {
        SpriteFormat::Avif => {
            let crf = options.crf.to_string();
            let cpu_used = options.cpu_used.to_string();
            args.extend(
                [
                    "-c:v",
                    "libaom-av1",
                    "-crf",
                    crf.as_str(),
                    "-b:v",
                    "0",
                    "-cpu-used",
                    cpu_used.as_str(),
                    "-row-mt",
                    "1",
                    "-tile-columns",
                    "2",
                    "-tile-rows",
                    "2",
                ]
                .map(OsString::from),
            );
        }
        SpriteFormat::Jpeg => {
            args.push("-q:v".into());
            args.push(options.jpeg_quality.to_string().into());
        }
    }

    args.push(output.into());
    args
}
