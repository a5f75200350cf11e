use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use engine::{probe_wav_length, ClockTrack, EngineConfig};
use renderer::RendererConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Track length used when neither an explicit length nor a WAV file is given.
const FALLBACK_TRACK_LENGTH: Duration = Duration::from_secs(180);

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let engine = resolve_engine_config(&cli)?;
    let length = resolve_track_length(&engine)?;
    let track = ClockTrack::new(length);

    let mut config = RendererConfig {
        vsync: !cli.no_vsync,
        engine,
        ..RendererConfig::default()
    };
    if let Some(size) = cli.size {
        config.surface_size = size;
    }
    renderer::run(config, track)
}

/// Loads the configuration file, if any, and layers the CLI flags on top.
fn resolve_engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };

    if let Some(primary) = &cli.primary {
        config.shaders.primary = primary.clone();
    }
    if let Some(post) = &cli.post {
        config.shaders.post = post.clone();
    }
    if let Some(track) = &cli.track {
        config.track.path = Some(track.clone());
    }
    if let Some(length) = cli.length {
        config.track.length = Some(length);
    }
    if let Some(interval) = cli.reload_interval {
        config.reload.interval = interval;
    }
    if cli.no_status {
        config.display.status_line = false;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    EngineConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config at {}", path.display()))
}

fn resolve_track_length(config: &EngineConfig) -> Result<f64> {
    if let Some(length) = config.track.length {
        return Ok(length.as_secs_f64());
    }
    if let Some(path) = &config.track.path {
        let length = probe_wav_length(path)
            .with_context(|| format!("failed to read track length from {}", path.display()))?;
        tracing::info!(path = %path.display(), length, "probed track length");
        return Ok(length);
    }
    tracing::debug!(
        length = %humantime::format_duration(FALLBACK_TRACK_LENGTH),
        "no track configured; using fallback length"
    );
    Ok(FALLBACK_TRACK_LENGTH.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn cli_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("leviathan.toml");
        fs::write(
            &path,
            "[shaders]\nprimary = \"a.frag\"\npost = \"b.frag\"\n[reload]\ninterval = \"1s\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "leviathan",
            "--config",
            path.to_str().unwrap(),
            "--post",
            "c.frag",
            "--no-status",
        ])
        .unwrap();
        let config = resolve_engine_config(&cli).unwrap();
        assert_eq!(config.shaders.primary, PathBuf::from("a.frag"));
        assert_eq!(config.shaders.post, PathBuf::from("c.frag"));
        assert_eq!(config.reload.interval, Duration::from_secs(1));
        assert!(!config.display.status_line);
    }

    #[test]
    fn overridden_interval_is_validated() {
        let cli = Cli::try_parse_from(["leviathan", "--reload-interval", "1h"]).unwrap();
        assert!(resolve_engine_config(&cli).is_err());
    }

    #[test]
    fn explicit_length_wins_over_track_file() {
        let mut config = EngineConfig::default();
        config.track.path = Some(PathBuf::from("/nonexistent/track.wav"));
        config.track.length = Some(Duration::from_secs(42));
        assert_eq!(resolve_track_length(&config).unwrap(), 42.0);

        config.track.length = None;
        assert!(resolve_track_length(&config).is_err());

        config.track.path = None;
        assert_eq!(resolve_track_length(&config).unwrap(), 180.0);
    }
}
