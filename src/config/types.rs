use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vodprep_av::actions::{OptimizeOptions, Preset, SpriteFormat, SpriteOptions};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub streams: StreamsConfig,

    #[serde(default)]
    pub sprite: SpriteConfig,

    #[serde(default)]
    pub optimize: OptimizeConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamsConfig {
    /// Directory holding one subdirectory of segments per stream
    #[serde(default = "default_streams_dir")]
    pub dir: PathBuf,

    /// Stream ids to process (empty = every subdirectory of `dir`)
    #[serde(default)]
    pub ids: Vec<String>,
}

fn default_streams_dir() -> PathBuf {
    PathBuf::from("./streams")
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            dir: default_streams_dir(),
            ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpriteConfig {
    /// Seconds between thumbnails
    #[serde(default = "default_interval")]
    pub interval: f64,

    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,

    #[serde(default = "default_thumbnail_height")]
    pub thumbnail_height: u32,

    #[serde(default = "default_columns")]
    pub columns: u32,

    #[serde(default = "default_max_thumbnails")]
    pub max_thumbnails: u32,

    #[serde(default)]
    pub format: SpriteFormat,

    /// Frame rate the sampling step assumes for the source segments
    #[serde(default = "default_source_frame_rate")]
    pub source_frame_rate: u32,

    /// libaom CRF for AVIF sprites (0-63)
    #[serde(default = "default_sprite_crf")]
    pub crf: u8,

    /// libaom speed for AVIF sprites (0-8)
    #[serde(default = "default_cpu_used")]
    pub cpu_used: u8,

    /// ffmpeg -q:v for JPEG sprites (2-31)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_interval() -> f64 {
    1.0
}
fn default_thumbnail_width() -> u32 {
    160
}
fn default_thumbnail_height() -> u32 {
    90
}
fn default_columns() -> u32 {
    10
}
fn default_max_thumbnails() -> u32 {
    300
}
fn default_source_frame_rate() -> u32 {
    30
}
fn default_sprite_crf() -> u8 {
    30
}
fn default_cpu_used() -> u8 {
    4
}
fn default_jpeg_quality() -> u8 {
    5
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            thumbnail_width: default_thumbnail_width(),
            thumbnail_height: default_thumbnail_height(),
            columns: default_columns(),
            max_thumbnails: default_max_thumbnails(),
            format: SpriteFormat::default(),
            source_frame_rate: default_source_frame_rate(),
            crf: default_sprite_crf(),
            cpu_used: default_cpu_used(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl From<&SpriteConfig> for SpriteOptions {
    fn from(config: &SpriteConfig) -> Self {
        Self {
            interval: config.interval,
            thumbnail_width: config.thumbnail_width,
            thumbnail_height: config.thumbnail_height,
            columns: config.columns,
            max_thumbnails: config.max_thumbnails,
            format: config.format,
            source_frame_rate: config.source_frame_rate,
            crf: config.crf,
            cpu_used: config.cpu_used,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizeConfig {
    /// x264 CRF (0-51)
    #[serde(default = "default_video_crf")]
    pub crf: u8,

    #[serde(default)]
    pub preset: Preset,

    /// Copy originals into `originals/` before replacing them (default: true)
    #[serde(default = "default_backup_originals")]
    pub backup_originals: bool,

    /// ffmpeg scale expression, e.g. "1280:-1"
    #[serde(default)]
    pub scale: Option<String>,

    /// e.g. "800k"
    #[serde(default)]
    pub max_bitrate: Option<String>,

    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

fn default_video_crf() -> u8 {
    23
}
fn default_backup_originals() -> bool {
    true
}
fn default_audio_bitrate() -> String {
    "128k".to_string()
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            crf: default_video_crf(),
            preset: Preset::default(),
            backup_originals: default_backup_originals(),
            scale: None,
            max_bitrate: None,
            audio_bitrate: default_audio_bitrate(),
        }
    }
}

impl From<&OptimizeConfig> for OptimizeOptions {
    fn from(config: &OptimizeConfig) -> Self {
        Self {
            crf: config.crf,
            preset: config.preset,
            backup_originals: config.backup_originals,
            scale: config.scale.clone(),
            max_bitrate: config.max_bitrate.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// Directory scanned for .jpeg files
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,

    /// Images wider than this are scaled down, never up
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// AVIF quality (1-100)
    #[serde(default = "default_image_quality")]
    pub quality: u8,

    /// AVIF encoder speed (1-10, higher is faster)
    #[serde(default = "default_image_speed")]
    pub speed: u8,
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("./public/images")
}
fn default_max_width() -> u32 {
    400
}
fn default_image_quality() -> u8 {
    30
}
fn default_image_speed() -> u8 {
    6
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            max_width: default_max_width(),
            quality: default_image_quality(),
            speed: default_image_speed(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Path to ffmpeg, overriding PATH lookup
    #[serde(default, rename = "ffmpeg", alias = "ffmpeg_path")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Path to ffprobe, overriding PATH lookup
    #[serde(default, rename = "ffprobe", alias = "ffprobe_path")]
    pub ffprobe_path: Option<PathBuf>,
}
