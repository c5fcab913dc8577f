//! Segment re-encoding for size reduction.

use super::run_ffmpeg;
use crate::{Error, Result, Toolchain, Workspace};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Directory, inside the segment directory, that receives original copies.
pub const BACKUP_DIR_NAME: &str = "originals";

/// x264 encoding speed presets, fastest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl Preset {
    /// Get the x264 preset name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Ultrafast => "ultrafast",
            Preset::Superfast => "superfast",
            Preset::Veryfast => "veryfast",
            Preset::Faster => "faster",
            Preset::Fast => "fast",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
            Preset::Slower => "slower",
            Preset::Veryslow => "veryslow",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ultrafast" => Ok(Preset::Ultrafast),
            "superfast" => Ok(Preset::Superfast),
            "veryfast" => Ok(Preset::Veryfast),
            "faster" => Ok(Preset::Faster),
            "fast" => Ok(Preset::Fast),
            "medium" => Ok(Preset::Medium),
            "slow" => Ok(Preset::Slow),
            "slower" => Ok(Preset::Slower),
            "veryslow" => Ok(Preset::Veryslow),
            _ => Err(format!("Unknown x264 preset: {}", s)),
        }
    }
}

/// Re-encoding settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeOptions {
    /// x264 constant rate factor (0-51, lower is better).
    pub crf: u8,
    /// x264 speed preset.
    pub preset: Preset,
    /// Copy each original into [`BACKUP_DIR_NAME`] before replacing it.
    pub backup_originals: bool,
    /// ffmpeg scale expression, e.g. `1280:-1`.
    pub scale: Option<String>,
    /// Peak video bitrate, also used as the VBV buffer size, e.g. `800k`.
    pub max_bitrate: Option<String>,
    /// AAC bitrate, e.g. `128k`.
    pub audio_bitrate: String,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            crf: 23,
            preset: Preset::Medium,
            backup_originals: true,
            scale: None,
            max_bitrate: None,
            audio_bitrate: "128k".to_string(),
        }
    }
}

/// What happened to one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    /// The re-encoded file was smaller and replaced the original.
    Replaced { original_size: u64, optimized_size: u64 },
    /// The re-encoded file was not smaller; the original stays.
    Kept { original_size: u64, candidate_size: u64 },
    /// Re-encoding failed; the original stays.
    Failed { original_size: u64, error: String },
}

impl SegmentOutcome {
    /// Size of the segment before processing.
    pub fn original_size(&self) -> u64 {
        match self {
            SegmentOutcome::Replaced { original_size, .. }
            | SegmentOutcome::Kept { original_size, .. }
            | SegmentOutcome::Failed { original_size, .. } => *original_size,
        }
    }

    /// Size of the segment left on disk.
    pub fn final_size(&self) -> u64 {
        match self {
            SegmentOutcome::Replaced { optimized_size, .. } => *optimized_size,
            SegmentOutcome::Kept { original_size, .. }
            | SegmentOutcome::Failed { original_size, .. } => *original_size,
        }
    }
}

/// Outcome for one segment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    pub path: PathBuf,
    pub outcome: SegmentOutcome,
}

/// Size accounting for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub segments: Vec<SegmentReport>,
}

impl OptimizeReport {
    /// Bytes before processing.
    pub fn total_original_size(&self) -> u64 {
        self.segments.iter().map(|s| s.outcome.original_size()).sum()
    }

    /// Bytes on disk after processing.
    pub fn total_final_size(&self) -> u64 {
        self.segments.iter().map(|s| s.outcome.final_size()).sum()
    }

    /// Percentage of bytes saved, `0.0` for an empty report.
    pub fn reduction_percent(&self) -> f64 {
        reduction_percent(self.total_original_size(), self.total_final_size())
    }

    /// Number of segments that were replaced.
    pub fn replaced_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s.outcome, SegmentOutcome::Replaced { .. }))
            .count()
    }

    /// Number of segments that failed to re-encode.
    pub fn failed_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s.outcome, SegmentOutcome::Failed { .. }))
            .count()
    }
}

/// Percentage saved going from `before` to `after` bytes.
pub fn reduction_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (before as f64 - after as f64) / before as f64 * 100.0
}

/// Re-encode every `.ts` segment in `dir`, keeping only smaller results.
///
/// A failure on one segment is recorded in the report and does not stop the
/// run.
///
/// # Errors
///
/// - [`Error::NoSegments`] if `dir` holds no `.ts` files.
/// - [`Error::InvalidInput`] if `crf` is out of range.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub fn optimize_segments(
    tools: &Toolchain,
    dir: &Path,
    options: &OptimizeOptions,
) -> Result<OptimizeReport> {
    if options.crf > 51 {
        return Err(Error::InvalidInput(format!(
            "CRF must be between 0 and 51, got {}",
            options.crf
        )));
    }

    let workspace = Workspace::new(dir)?;
    let total = workspace.segments().len();

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Optimizing {} TS segments in {:?} (crf={}, preset={}, scale={}, max_bitrate={}, audio_bitrate={})",
        total,
        dir,
        options.crf,
        options.preset,
        options.scale.as_deref().unwrap_or("original"),
        options.max_bitrate.as_deref().unwrap_or("unlimited"),
        options.audio_bitrate
    );

    let mut report = OptimizeReport::default();

    for (i, segment) in workspace.segments().iter().enumerate() {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "[{}/{}] Optimizing {:?}",
            i + 1,
            total,
            segment.file_name().unwrap_or_default()
        );

        let outcome = optimize_one(tools, &workspace, segment, options);

        #[cfg(feature = "tracing")]
        match &outcome {
            SegmentOutcome::Replaced {
                original_size,
                optimized_size,
            } => tracing::info!(
                "  {:?}: {} -> {} bytes ({:.2}% smaller)",
                segment,
                original_size,
                optimized_size,
                reduction_percent(*original_size, *optimized_size)
            ),
            SegmentOutcome::Kept { .. } => {
                tracing::info!("  Keeping {:?}: re-encoded file is not smaller", segment)
            }
            SegmentOutcome::Failed { error, .. } => {
                tracing::error!("  Failed to optimize {:?}: {}", segment, error)
            }
        }

        report.segments.push(SegmentReport {
            path: segment.clone(),
            outcome,
        });
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Optimization of {:?} complete: {} -> {} bytes ({:.2}% smaller, {} failed)",
        dir,
        report.total_original_size(),
        report.total_final_size(),
        report.reduction_percent(),
        report.failed_count()
    );

    Ok(report)
}

fn optimize_one(
    tools: &Toolchain,
    workspace: &Workspace,
    segment: &Path,
    options: &OptimizeOptions,
) -> SegmentOutcome {
    let original_size = match std::fs::metadata(segment) {
        Ok(meta) => meta.len(),
        Err(e) => {
            return SegmentOutcome::Failed {
                original_size: 0,
                error: e.to_string(),
            }
        }
    };

    match reencode(tools, workspace, segment, original_size, options) {
        Ok(outcome) => outcome,
        Err(e) => SegmentOutcome::Failed {
            original_size,
            error: e.to_string(),
        },
    }
}

fn reencode(
    tools: &Toolchain,
    workspace: &Workspace,
    segment: &Path,
    original_size: u64,
    options: &OptimizeOptions,
) -> Result<SegmentOutcome> {
    let file_name = segment
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("Invalid segment path: {:?}", segment)))?;
    let candidate = workspace.temp_dir().join(file_name);

    let result = run_ffmpeg(&tools.ffmpeg, &ffmpeg_args(segment, &candidate, options))
        .and_then(|()| Ok(std::fs::metadata(&candidate)?.len()))
        .and_then(|candidate_size| {
            if options.backup_originals {
                workspace.backup(segment, &workspace.output_file(BACKUP_DIR_NAME))?;
            }

            if candidate_size < original_size {
                workspace.replace(&candidate, segment)?;
                Ok(SegmentOutcome::Replaced {
                    original_size,
                    optimized_size: candidate_size,
                })
            } else {
                Ok(SegmentOutcome::Kept {
                    original_size,
                    candidate_size,
                })
            }
        });

    if candidate.exists() {
        let _ = std::fs::remove_file(&candidate);
    }

    result
}

fn ffmpeg_args(input: &Path, output: &Path, options: &OptimizeOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];

    if let Some(ref scale) = options.scale {
        args.push("-vf".into());
        args.push(format!("scale={}", scale).into());
    }

    args.extend(["-c:v", "libx264", "-crf"].map(OsString::from));
    args.push(options.crf.to_string().into());
    args.push("-preset".into());
    args.push(options.preset.as_str().into());

    if let Some(ref rate) = options.max_bitrate {
        args.extend(["-maxrate", rate.as_str(), "-bufsize", rate.as_str()].map(OsString::from));
    }

    args.extend(["-c:a", "aac", "-b:a", options.audio_bitrate.as_str()].map(OsString::from));
    args.push(output.into());
    args
}
