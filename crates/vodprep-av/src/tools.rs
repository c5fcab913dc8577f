//! External tool detection and management.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use vodprep_av::check_tool;
///
/// let info = check_tool("ffprobe");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_with_arg(name, "-version")
}

/// Check if a tool is available using a custom version argument.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let mut info = run_version(name, Path::new(name), version_arg);
    if info.available {
        info.path = which::which(name).ok();
    }
    info
}

/// Check the executable at `program`, reporting it under `name`.
pub fn check_tool_at(name: &str, program: &Path) -> ToolInfo {
    let mut info = run_version(name, program, "-version");
    if info.available {
        info.path = Some(program.to_path_buf());
    }
    info
}

fn run_version(name: &str, program: &Path, version_arg: &str) -> ToolInfo {
    let result = Command::new(program).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path: None,
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check the tools the asset pipeline shells out to.
///
/// Returns information about ffmpeg and ffprobe.
pub fn check_tools() -> Vec<ToolInfo> {
    check_configured_tools(None, None)
}

/// Like [`check_tools`], but checks configured executables the same way
/// [`Toolchain::discover`] resolves them: an existing configured path wins
/// over PATH lookup.
pub fn check_configured_tools(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Vec<ToolInfo> {
    [("ffmpeg", ffmpeg), ("ffprobe", ffprobe)]
        .into_iter()
        .map(|(name, configured)| match configured {
            Some(path) if path.exists() => check_tool_at(name, path),
            _ => check_tool(name),
        })
        .collect()
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    require_tool(name)
}

/// Whether the ffmpeg at `ffmpeg` was built with the named encoder.
pub fn has_encoder(ffmpeg: &Path, encoder: &str) -> bool {
    let output = Command::new(ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let listing = String::from_utf8_lossy(&output.stdout);
            listing_has_encoder(&listing, encoder)
        }
        _ => false,
    }
}

/// Lines look like ` V....D libaom-av1  libaom AV1 (codec av1)`.
fn listing_has_encoder(listing: &str, encoder: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|name| name == encoder)
}

/// Resolved paths of the executables the actions invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Path to ffmpeg.
    pub ffmpeg: PathBuf,
    /// Path to ffprobe.
    pub ffprobe: PathBuf,
}

impl Toolchain {
    /// Use the given executables as-is.
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Resolve ffmpeg and ffprobe, preferring configured paths over PATH.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if either tool cannot be located.
    pub fn discover(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Result<Self> {
        Ok(Self {
            ffmpeg: get_tool_path("ffmpeg", ffmpeg)?,
            ffprobe: get_tool_path("ffprobe", ffprobe)?,
        })
    }
}

impl Default for Toolchain {
    /// Bare names, resolved by the OS at spawn time.
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

/// Map a spawn failure to [`Error::ToolNotFound`] when the binary is missing.
pub(crate) fn spawn_error(tool: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::tool_not_found(tool)
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nonexistent_tool_12345");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_configured_path_is_checked_instead_of_path_lookup() {
        // An existing but non-executable file stands in for a broken install
        let file = tempfile::NamedTempFile::new().unwrap();
        let tools = check_configured_tools(Some(file.path()), None);

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "ffmpeg");
        assert!(!tools[0].available);
        assert!(tools[0].path.is_none());
        assert_eq!(tools[1].name, "ffprobe");
    }

    #[test]
    fn test_check_tool_at_missing_program() {
        let info = check_tool_at("ffmpeg", Path::new("/nonexistent/bin/ffmpeg"));
        assert_eq!(info.name, "ffmpeg");
        assert!(!info.available);
    }

    #[test]
    fn test_get_tool_path_missing() {
        let err = get_tool_path("nonexistent_tool_12345", None).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_get_tool_path_prefers_existing_config_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = get_tool_path("nonexistent_tool_12345", Some(file.path())).unwrap();
        assert_eq!(path, file.path());
    }

    #[test]
    fn test_listing_has_encoder() {
        let listing = "Encoders:\n V..... = Video\n ------\n V....D libaom-av1           libaom AV1 (codec av1)\n V....D mjpeg                MJPEG (Motion JPEG)\n";
        assert!(listing_has_encoder(listing, "libaom-av1"));
        assert!(listing_has_encoder(listing, "mjpeg"));
        assert!(!listing_has_encoder(listing, "libx264"));
    }

    #[test]
    fn test_has_encoder_without_ffmpeg() {
        assert!(!has_encoder(Path::new("nonexistent_tool_12345"), "libx264"));
    }

    #[test]
    fn test_spawn_error_not_found() {
        let err = spawn_error("ffmpeg", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, Error::ToolNotFound { ref tool } if tool == "ffmpeg"));
    }
}
