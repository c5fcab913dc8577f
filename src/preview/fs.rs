//! Seek previews read from a local streams directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{check_stream_id, parse_metadata, PreviewError, SeekThumbnail, SpriteSource};
use vodprep_sprite::METADATA_FILE_NAME;

/// Sprite file names tried in order.
const SPRITE_FILE_NAMES: [&str; 2] = ["sprite.avif", "sprite.jpg"];

/// Loads seek previews from `<streams_dir>/<id>/`.
#[derive(Debug, Clone)]
pub struct FsSpriteSource {
    streams_dir: PathBuf,
    url_prefix: String,
}

impl FsSpriteSource {
    /// Sprite URLs are reported as `/streams/<id>/<file>`.
    pub fn new(streams_dir: impl Into<PathBuf>) -> Self {
        Self {
            streams_dir: streams_dir.into(),
            url_prefix: "/streams".to_string(),
        }
    }

    /// Report sprite URLs under `prefix` instead of `/streams`.
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn streams_dir(&self) -> &Path {
        &self.streams_dir
    }

    async fn find_sprite(&self, stream_dir: &Path) -> Option<&'static str> {
        for name in SPRITE_FILE_NAMES {
            if let Ok(meta) = tokio::fs::metadata(stream_dir.join(name)).await {
                if meta.is_file() {
                    return Some(name);
                }
            }
        }
        None
    }
}

#[async_trait]
impl SpriteSource for FsSpriteSource {
    async fn load(&self, stream_id: &str) -> Result<SeekThumbnail, PreviewError> {
        check_stream_id(stream_id)?;

        let stream_dir = self.streams_dir.join(stream_id);
        let metadata_path = stream_dir.join(METADATA_FILE_NAME);
        debug!("Reading sprite metadata from {}", metadata_path.display());

        let body = tokio::fs::read_to_string(&metadata_path).await.map_err(|e| {
            PreviewError::unavailable(stream_id, format!("{}: {}", metadata_path.display(), e))
        })?;
        let metadata = parse_metadata(stream_id, &body)?;

        let sprite_name = self.find_sprite(&stream_dir).await.ok_or_else(|| {
            PreviewError::unavailable(
                stream_id,
                format!("no sprite image in {}", stream_dir.display()),
            )
        })?;

        let sprite_url = format!("{}/{}/{}", self.url_prefix, stream_id, sprite_name);
        SeekThumbnail::new(sprite_url, metadata).map_err(|source| PreviewError::InvalidMetadata {
            stream_id: stream_id.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use vodprep_sprite::SpriteMetadata;

    fn write_stream(root: &Path, id: &str, sprite: Option<&str>) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        let meta = SpriteMetadata::new_grid(160, 90, 10, 596, 1.0, 596.0);
        std::fs::write(dir.join(METADATA_FILE_NAME), meta.to_json_pretty().unwrap()).unwrap();
        if let Some(name) = sprite {
            std::fs::write(dir.join(name), b"sprite").unwrap();
        }
    }

    #[tokio::test]
    async fn test_load_avif_sprite() {
        let root = tempfile::tempdir().unwrap();
        write_stream(root.path(), "wing-it", Some("sprite.avif"));

        let source = FsSpriteSource::new(root.path());
        let thumb = source.load("wing-it").await.unwrap();

        assert_eq!(thumb.sprite_url(), "/streams/wing-it/sprite.avif");
        assert_eq!(thumb.metadata().rows, 60);
        assert_eq!(thumb.style_at(123.0).background_position, "-480px -1080px");
    }

    #[tokio::test]
    async fn test_load_falls_back_to_jpeg_sprite() {
        let root = tempfile::tempdir().unwrap();
        write_stream(root.path(), "glasshalf", Some("sprite.jpg"));

        let source = FsSpriteSource::new(root.path()).with_url_prefix("https://cdn.test/vod/");
        let thumb = source.load("glasshalf").await.unwrap();
        assert_eq!(thumb.sprite_url(), "https://cdn.test/vod/glasshalf/sprite.jpg");
    }

    #[tokio::test]
    async fn test_missing_files_are_unavailable() {
        let root = tempfile::tempdir().unwrap();
        write_stream(root.path(), "no-sprite", None);
        let source = FsSpriteSource::new(root.path());

        assert_matches!(
            source.load("no-sprite").await,
            Err(PreviewError::Unavailable { .. })
        );
        assert_matches!(
            source.load("missing").await,
            Err(PreviewError::Unavailable { .. })
        );
    }

    #[tokio::test]
    async fn test_invalid_metadata() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("broken");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(METADATA_FILE_NAME), r#"{"version":1}"#).unwrap();
        std::fs::write(dir.join("sprite.avif"), b"sprite").unwrap();

        let source = FsSpriteSource::new(root.path());
        assert_matches!(
            source.load("broken").await,
            Err(PreviewError::InvalidMetadata { .. })
        );
        assert_matches!(
            source.load("../broken").await,
            Err(PreviewError::InvalidStreamId(_))
        );
    }

    #[tokio::test]
    async fn test_load_optional_swallows_errors() {
        let root = tempfile::tempdir().unwrap();
        let source = FsSpriteSource::new(root.path());
        assert!(super::super::load_optional(&source, "missing").await.is_none());
    }
}
