//! Seek previews served over HTTP.
//!
//! Expects the published layout `{base}/streams/{id}/sprite.json` beside
//! `{base}/streams/{id}/sprite.avif`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{check_stream_id, parse_metadata, PreviewError, SeekThumbnail, SpriteSource};
use vodprep_sprite::METADATA_FILE_NAME;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SPRITE_FILE_NAME: &str = "sprite.avif";

/// Loads seek previews from a static asset server.
pub struct HttpSpriteSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpriteSource {
    /// Create a source rooted at `base_url` (e.g. `https://cdn.example.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self::with_client(client, base_url)
    }

    /// Create a source that reuses an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL of a file in the stream's directory.
    pub fn asset_url(&self, stream_id: &str, file_name: &str) -> String {
        format!("{}/streams/{}/{}", self.base_url, stream_id, file_name)
    }

    async fn fetch_metadata(&self, stream_id: &str) -> Result<String, PreviewError> {
        let url = self.asset_url(stream_id, METADATA_FILE_NAME);
        debug!("Fetching sprite metadata from {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PreviewError::unavailable(stream_id, format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PreviewError::unavailable(
                stream_id,
                format!("GET {url} returned {status}"),
            ));
        }

        resp.text()
            .await
            .map_err(|e| PreviewError::unavailable(stream_id, format!("GET {url}: {e}")))
    }

    async fn check_sprite(&self, stream_id: &str, url: &str) -> Result<(), PreviewError> {
        let resp = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| PreviewError::unavailable(stream_id, format!("HEAD {url}: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PreviewError::unavailable(
                stream_id,
                format!("HEAD {url} returned {status}"),
            ))
        }
    }
}

#[async_trait]
impl SpriteSource for HttpSpriteSource {
    async fn load(&self, stream_id: &str) -> Result<SeekThumbnail, PreviewError> {
        check_stream_id(stream_id)?;

        let body = self.fetch_metadata(stream_id).await?;
        let metadata = parse_metadata(stream_id, &body)?;

        let sprite_url = self.asset_url(stream_id, SPRITE_FILE_NAME);
        self.check_sprite(stream_id, &sprite_url).await?;

        SeekThumbnail::new(sprite_url, metadata).map_err(|source| PreviewError::InvalidMetadata {
            stream_id: stream_id.to_string(),
            source,
        })
    }
}
