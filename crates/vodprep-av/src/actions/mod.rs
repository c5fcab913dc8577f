//! Asset preparation actions.
//!
//! This module provides the ffmpeg-driven operations run over a directory of
//! HLS segments:
//! - Seek-thumbnail sprite generation
//! - Segment re-encoding for size reduction

#[cfg(feature = "sprite")]
mod sprite;

#[cfg(feature = "optimize")]
mod optimize;

#[cfg(feature = "sprite")]
pub use sprite::{generate_sprite, plan_grid, SpriteFormat, SpriteOptions, SpriteOutput};

#[cfg(feature = "optimize")]
pub use optimize::{
    optimize_segments, OptimizeOptions, OptimizeReport, Preset, SegmentOutcome, SegmentReport,
    BACKUP_DIR_NAME,
};

use crate::tools::spawn_error;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run ffmpeg with `args`, failing with its stderr on a non-zero exit.
fn run_ffmpeg(ffmpeg: &Path, args: &[OsString]) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::debug!("Executing {:?} {:?}", ffmpeg, args);

    let output = Command::new(ffmpeg)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error("ffmpeg", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffmpeg", last_lines(&stderr, 5)));
    }

    Ok(())
}

/// ffmpeg prints its banner and stream dump first; the cause is at the end.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_lines() {
        assert_eq!(last_lines("a\nb\nc\nd\n", 2), "c\nd");
        assert_eq!(last_lines("only", 5), "only");
        assert_eq!(last_lines("", 3), "");
    }

    #[test]
    fn test_run_missing_ffmpeg() {
        let err = run_ffmpeg(Path::new("nonexistent_tool_12345"), &[]).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
