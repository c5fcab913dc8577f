mod cli;

use vodprep::{batch, config, images, preview};
use vodprep::preview::SpriteSource;
use vodprep_av::actions::{OptimizeOptions, SegmentOutcome, SpriteFormat, SpriteOptions};
use vodprep_av::Toolchain;
use vodprep_sprite::{locate, SpriteMetadata, ThumbnailStyle};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OptimizeArgs, SpriteArgs};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vodprep=trace,vodprep_av=trace,vodprep_sprite=debug".to_string()
        } else {
            "vodprep=info,vodprep_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Sprite { dirs, options } => run_sprite(&dirs, &options, cli.config.as_deref()),
        Commands::Optimize { dirs, options } => {
            run_optimize(&dirs, &options, cli.config.as_deref())
        }
        Commands::ConvertImages {
            dir,
            max_width,
            quality,
            recursive,
        } => convert_images(dir, max_width, quality, recursive, cli.config.as_deref()),
        Commands::Locate {
            metadata,
            seconds,
            sprite_url,
            json,
        } => locate_cell(&metadata, seconds, &sprite_url, json),
        Commands::Preview {
            base_url,
            stream_id,
            seconds,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(preview_remote(&base_url, &stream_id, seconds))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vodprep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn toolchain(config: &config::Config) -> Result<Toolchain> {
    Toolchain::discover(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    )
    .context("ffmpeg and ffprobe are required; run `vodprep check-tools`")
}

fn sprite_options(config: &config::Config, args: &SpriteArgs) -> SpriteOptions {
    let mut options = SpriteOptions::from(&config.sprite);
    if let Some(interval) = args.interval {
        options.interval = interval;
    }
    if let Some(width) = args.width {
        options.thumbnail_width = width;
    }
    if let Some(height) = args.height {
        options.thumbnail_height = height;
    }
    if let Some(columns) = args.columns {
        options.columns = columns;
    }
    if let Some(max) = args.max_thumbnails {
        options.max_thumbnails = max;
    }
    if args.jpeg {
        options.format = SpriteFormat::Jpeg;
    }
    options
}

fn optimize_options(config: &config::Config, args: &OptimizeArgs) -> OptimizeOptions {
    let mut options = OptimizeOptions::from(&config.optimize);
    if let Some(crf) = args.crf {
        options.crf = crf;
    }
    if let Some(preset) = args.preset {
        options.preset = preset;
    }
    if args.scale.is_some() {
        options.scale = args.scale.clone();
    }
    if args.max_bitrate.is_some() {
        options.max_bitrate = args.max_bitrate.clone();
    }
    if let Some(ref audio) = args.audio_bitrate {
        options.audio_bitrate = audio.clone();
    }
    if args.no_backup {
        options.backup_originals = false;
    }
    options
}

fn run_sprite(dirs: &[PathBuf], args: &SpriteArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let options = sprite_options(&config, args);

    let tools = toolchain(&config)?;
    batch::ensure_sprite_encoder(&tools, &options)?;

    let dirs = batch::resolve_stream_dirs(dirs, &config.streams)?;
    let results = batch::sprite_streams(&tools, &dirs, &options)?;

    println!();
    for result in &results {
        match &result.outcome {
            Ok(output) => println!(
                "✓ {} - {} frames in {}x{} grid ({}x{} px)",
                result.dir.display(),
                output.metadata.count,
                output.metadata.columns,
                output.metadata.rows,
                output.metadata.sprite_width(),
                output.metadata.sprite_height()
            ),
            Err(e) => println!("✗ {} - {}", result.dir.display(), e),
        }
    }

    Ok(())
}

fn run_optimize(dirs: &[PathBuf], args: &OptimizeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let options = optimize_options(&config, args);

    let tools = toolchain(&config)?;
    let dirs = batch::resolve_stream_dirs(dirs, &config.streams)?;
    let results = batch::optimize_streams(&tools, &dirs, &options)?;

    for result in &results {
        println!("\n{}", result.dir.display());
        let report = match &result.outcome {
            Ok(report) => report,
            Err(e) => {
                println!("  ✗ {}", e);
                continue;
            }
        };

        for segment in &report.segments {
            let name = segment
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match &segment.outcome {
                SegmentOutcome::Replaced {
                    original_size,
                    optimized_size,
                } => println!(
                    "  ✓ {}: {} -> {}",
                    name,
                    format_size(*original_size),
                    format_size(*optimized_size)
                ),
                SegmentOutcome::Kept { original_size, .. } => {
                    println!("  = {}: {} (kept original)", name, format_size(*original_size))
                }
                SegmentOutcome::Failed { error, .. } => println!("  ✗ {}: {}", name, error),
            }
        }

        println!(
            "  Total: {} -> {} ({:.1}% reduction)",
            format_size(report.total_original_size()),
            format_size(report.total_final_size()),
            report.reduction_percent()
        );
        if report.failed_count() > 0 {
            println!("  Failed segments: {}", report.failed_count());
        }
    }

    Ok(())
}

fn convert_images(
    dir: Option<PathBuf>,
    max_width: Option<u32>,
    quality: Option<u8>,
    recursive: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let dir = dir.unwrap_or_else(|| config.images.dir.clone());
    if !dir.is_dir() {
        anyhow::bail!("Image directory does not exist: {:?}", dir);
    }

    let mut settings = images::AvifSettings::from(&config.images);
    if let Some(width) = max_width {
        settings.max_width = width;
    }
    if let Some(quality) = quality {
        if !(1..=100).contains(&quality) {
            anyhow::bail!("--quality must be between 1 and 100, got {}", quality);
        }
        settings.quality = quality;
    }

    let summary = images::convert_dir(&dir, recursive, &settings)?;
    println!(
        "Converted {} images, {} failed",
        summary.converted.len(),
        summary.failed.len()
    );
    for (path, error) in &summary.failed {
        println!("  ✗ {}: {}", path.display(), error);
    }

    Ok(())
}

fn locate_cell(metadata_path: &Path, seconds: f64, sprite_url: &str, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(metadata_path)
        .with_context(|| format!("Failed to read sprite metadata: {:?}", metadata_path))?;
    let metadata = SpriteMetadata::from_json(&content)
        .with_context(|| format!("Invalid sprite metadata: {:?}", metadata_path))?;

    let cell = locate(seconds, &metadata);
    let style = ThumbnailStyle::new(sprite_url, &cell);

    if json {
        let out = serde_json::json!({ "cell": cell, "style": style });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Frame: {}", cell.frame_index);
        println!("Cell: row {}, column {}", cell.row, cell.column);
        println!("Offset: {}px, {}px", cell.offset_x, cell.offset_y);
        println!("Sprite: {}x{} px", cell.sprite_width, cell.sprite_height);
        println!("Style: {}", style);
    }

    Ok(())
}

async fn preview_remote(base_url: &str, stream_id: &str, seconds: f64) -> Result<()> {
    let source = preview::HttpSpriteSource::new(base_url);
    let thumbnail = source.load(stream_id).await?;

    let cell = thumbnail.locate(seconds);
    println!("Sprite: {}", thumbnail.sprite_url());
    println!(
        "Frame: {} of {} (row {}, column {})",
        cell.frame_index,
        thumbnail.metadata().count,
        cell.row,
        cell.column
    );
    println!("Style: {}", thumbnail.style_at(seconds));

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = vodprep_av::check_configured_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    if let Ok(toolchain) = toolchain(&config) {
        println!("\nEncoders:");
        for (encoder, purpose) in [("libaom-av1", "AVIF sprites"), ("libx264", "segment optimization")] {
            let status = if vodprep_av::has_encoder(&toolchain.ffmpeg, encoder) {
                "✓"
            } else {
                all_ok = false;
                "✗"
            };
            println!("{} {} ({})", status, encoder, purpose);
        }
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Streams dir: {}", config.streams.dir.display());
    println!("  Stream ids: {}", config.streams.ids.len());
    println!(
        "  Sprite: {}s interval, {}x{} thumbnails, {} columns, {:?}",
        config.sprite.interval,
        config.sprite.thumbnail_width,
        config.sprite.thumbnail_height,
        config.sprite.columns,
        config.sprite.format
    );
    println!(
        "  Optimize: crf {}, preset {}, backups {}",
        config.optimize.crf,
        config.optimize.preset,
        if config.optimize.backup_originals { "on" } else { "off" }
    );
    println!("  Images dir: {}", config.images.dir.display());

    Ok(())
}

fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
