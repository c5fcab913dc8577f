//! FFprobe-based duration probing.

use crate::tools::spawn_error;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Probe the container duration of a media file, in seconds.
///
/// Returns `Ok(None)` when ffprobe succeeds but reports no usable duration
/// (`N/A` or an empty line), which happens for truncated segments.
pub fn probe_duration(ffprobe: &Path, path: &Path) -> Result<Option<f64>> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| spawn_error("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.to_string()));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    Ok(parse_duration(&stdout))
}

/// Sum the durations of `segments`.
///
/// Segments whose duration cannot be read contribute nothing; a missing
/// ffprobe still fails the whole call.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub fn total_duration(ffprobe: &Path, segments: &[PathBuf]) -> Result<f64> {
    let mut total = 0.0;

    for segment in segments {
        match probe_duration(ffprobe, segment) {
            Ok(Some(duration)) => total += duration,
            Ok(None) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("No duration reported for {:?}", segment);
            }
            Err(e @ Error::ToolNotFound { .. }) => return Err(e),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Could not probe {:?}: {}", segment, e);
            }
        }
    }

    Ok(total)
}

fn parse_duration(output: &str) -> Option<f64> {
    output
        .trim()
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10.010000\n"), Some(10.01));
        assert_eq!(parse_duration("  4.5  "), Some(4.5));
        assert_eq!(parse_duration("N/A\n"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("-1"), None);
    }

    #[test]
    fn test_probe_missing_file() {
        let err = probe_duration(Path::new("ffprobe"), Path::new("/nonexistent/seg0.ts")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_total_duration_missing_ffprobe() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = total_duration(
            Path::new("nonexistent_tool_12345"),
            &[file.path().to_path_buf()],
        )
        .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_total_duration_empty() {
        assert_eq!(total_duration(Path::new("ffprobe"), &[]).unwrap(), 0.0);
    }
}
