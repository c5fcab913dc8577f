mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./vodprep.toml",
        "./config.toml",
        "~/.config/vodprep/config.toml",
        "/etc/vodprep/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    // Validate sprite config
    let sprite = &config.sprite;
    if !sprite.interval.is_finite() || sprite.interval <= 0.0 {
        anyhow::bail!("sprite.interval must be positive, got {}", sprite.interval);
    }
    if sprite.thumbnail_width == 0 || sprite.thumbnail_height == 0 {
        anyhow::bail!("sprite thumbnail dimensions cannot be 0");
    }
    if sprite.columns == 0 {
        anyhow::bail!("sprite.columns cannot be 0");
    }
    if sprite.max_thumbnails == 0 {
        anyhow::bail!("sprite.max_thumbnails cannot be 0");
    }
    if sprite.source_frame_rate == 0 {
        anyhow::bail!("sprite.source_frame_rate cannot be 0");
    }
    if sprite.crf > 63 {
        anyhow::bail!("sprite.crf must be between 0 and 63, got {}", sprite.crf);
    }

    // Validate optimize config
    if config.optimize.crf > 51 {
        anyhow::bail!(
            "optimize.crf must be between 0 and 51, got {}",
            config.optimize.crf
        );
    }

    // Validate images config
    let images = &config.images;
    if images.max_width == 0 {
        anyhow::bail!("images.max_width cannot be 0");
    }
    if !(1..=100).contains(&images.quality) {
        anyhow::bail!("images.quality must be between 1 and 100, got {}", images.quality);
    }
    if !(1..=10).contains(&images.speed) {
        anyhow::bail!("images.speed must be between 1 and 10, got {}", images.speed);
    }

    // Validate stream paths exist
    if !config.streams.dir.exists() {
        tracing::warn!("Streams directory does not exist: {:?}", config.streams.dir);
    }

    Ok(())
}
