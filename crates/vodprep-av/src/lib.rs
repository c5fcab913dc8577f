//! # vodprep-av
//!
//! ffmpeg/ffprobe plumbing for preparing HLS stream assets.
//!
//! This crate provides functionality for:
//! - Locating the external tools and checking their encoders
//! - Probing segment durations with ffprobe
//! - Generating seek-thumbnail sprites from a directory of TS segments
//! - Re-encoding TS segments to reduce their size
//!
//! ## Features
//!
//! - `probe` (default) - Segment duration probing using ffprobe
//! - `sprite` (default) - Sprite generation using ffmpeg
//! - `optimize` (default) - Segment re-encoding using ffmpeg
//! - `all` - Enable all features
//!
//! ## Example
//!
//! ```no_run
//! use vodprep_av::{actions, Toolchain};
//!
//! let tools = Toolchain::discover(None, None)?;
//! let output = actions::generate_sprite(
//!     &tools,
//!     "/srv/streams/wing-it".as_ref(),
//!     &actions::SpriteOptions::default(),
//! )?;
//! println!("{} frames", output.metadata.count);
//! # Ok::<(), vodprep_av::Error>(())
//! ```

mod error;
pub mod tools;
pub mod workspace;

#[cfg(feature = "probe")]
pub mod probe;

pub mod actions;

// Re-exports
pub use error::{Error, Result};
pub use tools::{
    check_configured_tools, check_tool, check_tools, has_encoder, require_tool, ToolInfo,
    Toolchain,
};
pub use workspace::{list_segments, Workspace};

#[cfg(feature = "probe")]
pub use probe::{probe_duration, total_duration};
