//! CLI end-to-end tests
//!
//! Tests for the vodprep command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the vodprep binary
#[allow(deprecated)]
fn vodprep_cmd() -> Command {
    Command::cargo_bin("vodprep").unwrap()
}

/// Write a 10-column sprite descriptor with `count` one-second frames.
fn write_sprite_json(dir: &Path, count: u32) -> PathBuf {
    let rows = count.div_ceil(10);
    let path = dir.join("sprite.json");
    fs::write(
        &path,
        format!(
            r#"{{
  "version": 1,
  "thumbnailWidth": 160,
  "thumbnailHeight": 90,
  "columns": 10,
  "rows": {rows},
  "count": {count},
  "interval": 1.0,
  "duration": {count}.0
}}"#
        ),
    )
    .unwrap();
    path
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = vodprep_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = vodprep_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vodprep"))
        .stdout(predicate::str::contains("sprite"))
        .stdout(predicate::str::contains("optimize"))
        .stdout(predicate::str::contains("convert-images"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = vodprep_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = vodprep_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_check_tools_uses_configured_paths() {
    let dir = tempdir().unwrap();
    // Exists but is not executable
    let fake_ffmpeg = dir.path().join("ffmpeg");
    fs::write(&fake_ffmpeg, b"not a binary").unwrap();
    let config = dir.path().join("vodprep.toml");
    fs::write(
        &config,
        format!("[tools]\nffmpeg = {:?}\n", fake_ffmpeg.to_string_lossy()),
    )
    .unwrap();

    let mut cmd = vodprep_cmd();
    cmd.arg("--config")
        .arg(&config)
        .arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("✗ ffmpeg"))
        .stdout(predicate::str::contains("Some tools are missing"));
}

#[test]
fn test_cli_locate_text() {
    let dir = tempdir().unwrap();
    let meta = write_sprite_json(dir.path(), 15);

    let mut cmd = vodprep_cmd();
    cmd.arg("locate")
        .arg(&meta)
        .arg("11.6")
        .assert()
        .success()
        .stdout(predicate::str::contains("Frame: 12"))
        .stdout(predicate::str::contains("row 1, column 2"))
        .stdout(predicate::str::contains("background-position: -320px -90px"))
        .stdout(predicate::str::contains("background-size: 1600px 180px"));
}

#[test]
fn test_cli_locate_clamps_past_end() {
    let dir = tempdir().unwrap();
    let meta = write_sprite_json(dir.path(), 15);

    let mut cmd = vodprep_cmd();
    cmd.arg("locate")
        .arg(&meta)
        .arg("1000")
        .assert()
        .success()
        .stdout(predicate::str::contains("Frame: 14"));
}

#[test]
fn test_cli_locate_negative_time() {
    let dir = tempdir().unwrap();
    let meta = write_sprite_json(dir.path(), 15);

    let mut cmd = vodprep_cmd();
    cmd.arg("locate")
        .arg(&meta)
        .arg("-3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Frame: 0"));
}

#[test]
fn test_cli_locate_json() {
    let dir = tempdir().unwrap();
    let meta = write_sprite_json(dir.path(), 596);

    let mut cmd = vodprep_cmd();
    let output = cmd
        .arg("locate")
        .arg(&meta)
        .arg("123")
        .arg("--json")
        .arg("--sprite-url")
        .arg("/streams/wing-it/sprite.avif")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["cell"]["frameIndex"], 123);
    assert_eq!(json["cell"]["offsetX"], 480);
    assert_eq!(json["cell"]["offsetY"], 1080);
    assert_eq!(
        json["style"]["backgroundImage"],
        "url(/streams/wing-it/sprite.avif)"
    );
}

#[test]
fn test_cli_locate_invalid_metadata() {
    let dir = tempdir().unwrap();
    let meta = dir.path().join("sprite.json");
    fs::write(
        &meta,
        r#"{"version":1,"thumbnailWidth":160,"thumbnailHeight":90,"columns":0,"rows":1,"count":1,"interval":1,"duration":1}"#,
    )
    .unwrap();

    let mut cmd = vodprep_cmd();
    cmd.arg("locate")
        .arg(&meta)
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid sprite metadata"));
}

#[test]
fn test_cli_locate_missing_file() {
    let mut cmd = vodprep_cmd();
    cmd.arg("locate")
        .arg("/nonexistent/sprite.json")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read sprite metadata"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vodprep.toml");
    fs::write(
        &path,
        r#"
[streams]
dir = "/srv/streams"
ids = ["wing-it"]

[optimize]
preset = "slow"
"#,
    )
    .unwrap();

    let mut cmd = vodprep_cmd();
    cmd.arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("preset slow"));
}

#[test]
fn test_cli_validate_rejects_bad_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vodprep.toml");
    fs::write(&path, "[sprite]\ninterval = -1.0\n").unwrap();

    let mut cmd = vodprep_cmd();
    cmd.arg("--config")
        .arg(&path)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sprite.interval"));
}

#[test]
fn test_cli_convert_images_missing_dir() {
    let mut cmd = vodprep_cmd();
    cmd.arg("convert-images")
        .arg("/nonexistent/images")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_convert_images_empty_dir() {
    let dir = tempdir().unwrap();

    let mut cmd = vodprep_cmd();
    cmd.arg("convert-images")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Converted 0 images, 0 failed"));
}

#[test]
fn test_cli_optimize_rejects_unknown_preset() {
    let mut cmd = vodprep_cmd();
    cmd.arg("optimize")
        .arg("--preset")
        .arg("warp")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown x264 preset"));
}
