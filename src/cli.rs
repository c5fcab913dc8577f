use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vodprep_av::actions::Preset;

#[derive(Parser)]
#[command(name = "vodprep")]
#[command(author, version, about = "Asset preparation and seek previews for HLS video-on-demand")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate seek-thumbnail sprites from TS segments
    Sprite {
        /// Stream directories (defaults to the configured streams)
        dirs: Vec<PathBuf>,

        #[command(flatten)]
        options: SpriteArgs,
    },

    /// Re-encode TS segments to reduce their size
    Optimize {
        /// Stream directories (defaults to the configured streams)
        dirs: Vec<PathBuf>,

        #[command(flatten)]
        options: OptimizeArgs,
    },

    /// Convert .jpeg images to .avif
    ConvertImages {
        /// Directory to scan (defaults to images.dir from config)
        dir: Option<PathBuf>,

        /// Scale images wider than this down
        #[arg(long)]
        max_width: Option<u32>,

        /// AVIF quality (1-100)
        #[arg(long)]
        quality: Option<u8>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show which sprite cell previews a playback position
    Locate {
        /// Path to sprite.json
        #[arg(required = true)]
        metadata: PathBuf,

        /// Playback position in seconds
        #[arg(required = true, allow_negative_numbers = true)]
        seconds: f64,

        /// Sprite URL used in the printed style
        #[arg(long, default_value = "sprite.avif")]
        sprite_url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a published seek preview over HTTP and show one thumbnail
    Preview {
        /// Base URL the streams are served from
        #[arg(required = true)]
        base_url: String,

        /// Stream id
        #[arg(required = true)]
        stream_id: String,

        /// Playback position in seconds
        #[arg(required = true, allow_negative_numbers = true)]
        seconds: f64,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

/// Overrides for the `[sprite]` config section.
#[derive(Args, Default)]
pub struct SpriteArgs {
    /// Seconds between thumbnails
    #[arg(long)]
    pub interval: Option<f64>,

    /// Thumbnail width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Thumbnail height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Thumbnails per sprite row
    #[arg(long)]
    pub columns: Option<u32>,

    /// Upper bound on thumbnails per stream
    #[arg(long)]
    pub max_thumbnails: Option<u32>,

    /// Write a JPEG sprite instead of AVIF
    #[arg(long)]
    pub jpeg: bool,
}

/// Overrides for the `[optimize]` config section.
#[derive(Args, Default)]
pub struct OptimizeArgs {
    /// x264 CRF (0-51)
    #[arg(long)]
    pub crf: Option<u8>,

    /// x264 preset
    #[arg(long)]
    pub preset: Option<Preset>,

    /// ffmpeg scale expression, e.g. 1280:-1
    #[arg(long)]
    pub scale: Option<String>,

    /// Maximum video bitrate, e.g. 800k
    #[arg(long)]
    pub max_bitrate: Option<String>,

    /// Audio bitrate, e.g. 128k
    #[arg(long)]
    pub audio_bitrate: Option<String>,

    /// Do not keep copies of the original segments
    #[arg(long)]
    pub no_backup: bool,
}
