//! Workspace management for segment directory processing.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Extension of MPEG-TS media segments.
pub const SEGMENT_EXTENSION: &str = "ts";

/// Workspace over one directory of HLS segments.
///
/// Holds the sorted list of `.ts` segments and a scratch directory created
/// inside the segment directory, so finished files can be renamed into place
/// without crossing filesystems. The scratch directory is removed on drop.
///
/// # Example
///
/// ```no_run
/// use vodprep_av::Workspace;
///
/// let workspace = Workspace::new("/srv/streams/wing-it")?;
/// for segment in workspace.segments() {
///     println!("{}", segment.display());
/// }
/// # Ok::<(), vodprep_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    dir: PathBuf,
    segments: Vec<PathBuf>,
}

impl Workspace {
    /// Open a segment directory.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if `dir` does not exist.
    /// - [`Error::NoSegments`] if it holds no `.ts` files.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::file_not_found(dir));
        }

        let segments = list_segments(dir)?;
        if segments.is_empty() {
            return Err(Error::no_segments(dir));
        }

        let temp_dir = tempfile::Builder::new()
            .prefix(".vodprep-")
            .tempdir_in(dir)
            .map_err(|e| Error::Workspace(format!("Failed to create scratch directory: {}", e)))?;

        Ok(Self {
            temp_dir,
            dir: dir.to_path_buf(),
            segments,
        })
    }

    /// Get the segment directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the segments, sorted by file name.
    pub fn segments(&self) -> &[PathBuf] {
        &self.segments
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Create a path inside the segment directory.
    pub fn output_file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Copy `segment` into `backup_dir`, creating the directory if needed.
    pub fn backup(&self, segment: &Path, backup_dir: &Path) -> Result<PathBuf> {
        let file_name = segment
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("Invalid segment path: {:?}", segment)))?;

        std::fs::create_dir_all(backup_dir).map_err(|e| {
            Error::Workspace(format!("Failed to create backup directory {:?}: {}", backup_dir, e))
        })?;

        let dest = backup_dir.join(file_name);
        std::fs::copy(segment, &dest)?;
        Ok(dest)
    }

    /// Move `candidate` over `dest`.
    ///
    /// The original is renamed aside first and restored if the move fails.
    pub fn replace(&self, candidate: &Path, dest: &Path) -> Result<()> {
        if !candidate.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                candidate
            )));
        }

        if dest.exists() {
            let aside = dest.with_extension("bak");
            std::fs::rename(dest, &aside).map_err(|e| {
                Error::Workspace(format!("Failed to move original file aside: {}", e))
            })?;

            if let Err(e) = std::fs::rename(candidate, dest) {
                let _ = std::fs::rename(&aside, dest);
                return Err(Error::Workspace(format!(
                    "Failed to move output to destination: {}",
                    e
                )));
            }

            let _ = std::fs::remove_file(&aside);
        } else {
            std::fs::rename(candidate, dest).map_err(|e| {
                Error::Workspace(format!("Failed to move output to destination: {}", e))
            })?;
        }

        Ok(())
    }
}

/// List the `.ts` files directly inside `dir`, sorted by file name.
pub fn list_segments(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut segments = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_segment = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == SEGMENT_EXTENSION);
        if is_segment {
            segments.push(path);
        }
    }

    segments.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(segments)
}
