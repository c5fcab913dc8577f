//! Seek preview loading.
//!
//! A player session loads a stream's sprite descriptor once, then answers
//! every hover over the seek bar from memory. Loading goes through a
//! [`SpriteSource`] so the same code serves published assets over HTTP and a
//! local streams directory.
//!
//! Any failure to load is reported as [`PreviewError`]; callers that only
//! want to show a preview when one exists use [`load_optional`].

mod fs;
mod http;

pub use fs::FsSpriteSource;
pub use http::HttpSpriteSource;

use async_trait::async_trait;
use vodprep_sprite::{locate, CellAddress, SpriteMetadata, ThumbnailStyle};

/// Errors raised while loading a stream's seek preview.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// The descriptor or the sprite image could not be fetched.
    #[error("seek thumbnails unavailable for {stream_id}: {reason}")]
    Unavailable { stream_id: String, reason: String },

    /// The descriptor was fetched but cannot be used.
    #[error("invalid sprite metadata for {stream_id}: {source}")]
    InvalidMetadata {
        stream_id: String,
        #[source]
        source: vodprep_sprite::Error,
    },

    /// The stream id is not a plain URL-safe path segment.
    #[error("invalid stream id: {0:?}")]
    InvalidStreamId(String),
}

impl PreviewError {
    pub(crate) fn unavailable(stream_id: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            stream_id: stream_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// A loaded seek preview: where the sprite lives and how it is laid out.
///
/// Only constructible from validated metadata, so every lookup through it
/// meets the precondition of [`locate`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeekThumbnail {
    sprite_url: String,
    metadata: SpriteMetadata,
}

impl SeekThumbnail {
    /// Pair a sprite URL with its descriptor.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `metadata` is degenerate.
    pub fn new(
        sprite_url: impl Into<String>,
        metadata: SpriteMetadata,
    ) -> vodprep_sprite::Result<Self> {
        metadata.validate()?;
        Ok(Self {
            sprite_url: sprite_url.into(),
            metadata,
        })
    }

    pub fn sprite_url(&self) -> &str {
        &self.sprite_url
    }

    pub fn metadata(&self) -> &SpriteMetadata {
        &self.metadata
    }

    /// Grid cell previewing `time_secs`.
    pub fn locate(&self, time_secs: f64) -> CellAddress {
        locate(time_secs, &self.metadata)
    }

    /// Background crop previewing `time_secs`.
    pub fn style_at(&self, time_secs: f64) -> ThumbnailStyle {
        ThumbnailStyle::new(&self.sprite_url, &self.locate(time_secs))
    }
}

/// Somewhere seek previews can be loaded from.
#[async_trait]
pub trait SpriteSource: Send + Sync {
    /// Load the preview for `stream_id`.
    async fn load(&self, stream_id: &str) -> Result<SeekThumbnail, PreviewError>;
}

/// Load a preview, logging and swallowing any failure.
pub async fn load_optional(source: &dyn SpriteSource, stream_id: &str) -> Option<SeekThumbnail> {
    match source.load(stream_id).await {
        Ok(thumbnail) => Some(thumbnail),
        Err(e) => {
            tracing::warn!("Seek preview disabled: {}", e);
            None
        }
    }
}

/// Accept only ids made of URL-unreserved characters, so an id is a single
/// path segment both on disk and in a URL without any escaping.
fn check_stream_id(stream_id: &str) -> Result<(), PreviewError> {
    let valid = !stream_id.is_empty()
        && stream_id != "."
        && stream_id != ".."
        && stream_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~'));

    if valid {
        Ok(())
    } else {
        Err(PreviewError::InvalidStreamId(stream_id.to_string()))
    }
}

/// Parse and validate a fetched descriptor.
fn parse_metadata(stream_id: &str, body: &str) -> Result<SpriteMetadata, PreviewError> {
    SpriteMetadata::from_json(body).map_err(|source| PreviewError::InvalidMetadata {
        stream_id: stream_id.to_string(),
        source,
    })
}
