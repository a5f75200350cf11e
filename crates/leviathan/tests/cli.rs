use std::fs;
use std::process::Command;

use tempfile::TempDir;

#[test]
fn help_lists_editor_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_leviathan"))
        .arg("--help")
        .output()
        .expect("failed to run leviathan --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--reload-interval"));
    assert!(stdout.contains("--primary"));
}

#[test]
fn missing_config_file_fails_before_opening_a_window() {
    let root = TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_leviathan"))
        .arg("--config")
        .arg(root.path().join("absent.toml"))
        .env_remove("LEVIATHAN_CONFIG")
        .status()
        .expect("failed to run leviathan");

    assert!(!status.success());
}

#[test]
fn malformed_config_file_is_rejected() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("leviathan.toml");
    fs::write(&path, "[reload]\ninterval = \"whenever\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_leviathan"))
        .arg("--config")
        .arg(&path)
        .output()
        .expect("failed to run leviathan");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load config"));
}

#[test]
fn unreadable_track_fails_before_opening_a_window() {
    let root = TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_leviathan"))
        .arg("--track")
        .arg(root.path().join("missing.wav"))
        .status()
        .expect("failed to run leviathan");

    assert!(!status.success());
}
