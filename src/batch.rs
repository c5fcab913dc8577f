//! Run sprite generation or segment optimization over several streams.
//!
//! Streams are processed one after another. A stream that fails is logged and
//! recorded; the rest still run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use vodprep_av::actions::{
    self, OptimizeOptions, OptimizeReport, SpriteFormat, SpriteOptions, SpriteOutput,
};
use vodprep_av::{has_encoder, Toolchain};

use crate::config::StreamsConfig;

/// Outcome of one stream directory.
#[derive(Debug)]
pub struct StreamResult<T> {
    pub dir: PathBuf,
    pub outcome: std::result::Result<T, vodprep_av::Error>,
}

impl<T> StreamResult<T> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Pick the directories to process.
///
/// Explicit `dirs` win; otherwise the configured stream ids under
/// `streams.dir`; otherwise every visible subdirectory of `streams.dir`.
pub fn resolve_stream_dirs(dirs: &[PathBuf], streams: &StreamsConfig) -> Result<Vec<PathBuf>> {
    if !dirs.is_empty() {
        return Ok(dirs.to_vec());
    }

    if !streams.ids.is_empty() {
        return Ok(streams.ids.iter().map(|id| streams.dir.join(id)).collect());
    }

    if !streams.dir.is_dir() {
        anyhow::bail!("Streams directory does not exist: {:?}", streams.dir);
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(&streams.dir).min_depth(1).max_depth(1) {
        let entry =
            entry.with_context(|| format!("Failed to read streams directory: {:?}", streams.dir))?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type().is_dir() && !hidden {
            found.push(entry.into_path());
        }
    }
    found.sort();

    if found.is_empty() {
        anyhow::bail!("No stream directories found in {:?}", streams.dir);
    }
    Ok(found)
}

/// Fail early when the configured sprite format has no encoder.
pub fn ensure_sprite_encoder(tools: &Toolchain, options: &SpriteOptions) -> Result<()> {
    if options.format == SpriteFormat::Jpeg {
        return Ok(());
    }

    let encoder = options.format.encoder();
    if !has_encoder(&tools.ffmpeg, encoder) {
        anyhow::bail!(
            "{} does not provide the {} encoder; install an ffmpeg build with it or use --jpeg",
            tools.ffmpeg.display(),
            encoder
        );
    }
    Ok(())
}

/// Generate a sprite for every directory.
pub fn sprite_streams(
    tools: &Toolchain,
    dirs: &[PathBuf],
    options: &SpriteOptions,
) -> Result<Vec<StreamResult<SpriteOutput>>> {
    run_each("Sprite generation", dirs, |dir| {
        let output = actions::generate_sprite(tools, dir, options)?;
        tracing::info!(
            "Wrote {} ({} frames, {}x{} grid)",
            output.sprite_path.display(),
            output.metadata.count,
            output.metadata.columns,
            output.metadata.rows
        );
        Ok(output)
    })
}

/// Optimize the segments of every directory.
pub fn optimize_streams(
    tools: &Toolchain,
    dirs: &[PathBuf],
    options: &OptimizeOptions,
) -> Result<Vec<StreamResult<OptimizeReport>>> {
    run_each("Optimization", dirs, |dir| {
        let report = actions::optimize_segments(tools, dir, options)?;
        tracing::info!(
            "{}: {} of {} segments replaced, {:.1}% smaller",
            dir.display(),
            report.replaced_count(),
            report.segments.len(),
            report.reduction_percent()
        );
        Ok(report)
    })
}

fn run_each<T, F>(task: &str, dirs: &[PathBuf], mut f: F) -> Result<Vec<StreamResult<T>>>
where
    F: FnMut(&Path) -> vodprep_av::Result<T>,
{
    let mut results = Vec::with_capacity(dirs.len());

    for (i, dir) in dirs.iter().enumerate() {
        tracing::info!("[{}/{}] {}", i + 1, dirs.len(), dir.display());
        let outcome = f(dir);
        if let Err(ref e) = outcome {
            tracing::error!("{} failed for {}: {}", task, dir.display(), e);
        }
        results.push(StreamResult {
            dir: dir.clone(),
            outcome,
        });
    }

    if !results.is_empty() && results.iter().all(|r| !r.is_ok()) {
        anyhow::bail!("{} failed for all {} streams", task, results.len());
    }

    Ok(results)
}
