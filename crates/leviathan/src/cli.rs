use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "leviathan",
    author,
    version,
    about = "Live shader editor with hot reload and audio transport"
)]
pub struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long, value_name = "FILE", env = "LEVIATHAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fragment shader rendered by the primary pass.
    #[arg(long, value_name = "FILE")]
    pub primary: Option<PathBuf>,

    /// Fragment shader applied to the primary output.
    #[arg(long, value_name = "FILE")]
    pub post: Option<PathBuf>,

    /// WAV file whose header determines the track length.
    #[arg(long, value_name = "FILE")]
    pub track: Option<PathBuf>,

    /// Explicit track length (e.g. `3m`, `95s`); wins over `--track`.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub length: Option<Duration>,

    /// Minimum time between two reloads of the same shader (e.g. `200ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub reload_interval: Option<Duration>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,

    /// Do not print the status line to the terminal.
    #[arg(long)]
    pub no_status: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{trimmed}' must be non-zero in both dimensions"));
    }
    Ok((width, height))
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(format!("duration '{trimmed}' must be non-negative"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid duration '{trimmed}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert_eq!(parse_size(" 640X480 "), Ok((640, 480)));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("wide x tall").is_err());
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("3m"), Ok(Duration::from_secs(180)));
        assert_eq!(parse_duration("1.5"), Ok(Duration::from_millis(1500)));
        assert!(parse_duration("-2").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn rejects_durations_too_large_to_represent() {
        assert!(parse_duration("inf").is_err());
        assert!(parse_duration("1e30").is_err());
        assert!(Cli::try_parse_from(["leviathan", "--length", "1e30"]).is_err());
        assert!(Cli::try_parse_from(["leviathan", "--reload-interval", "1e30"]).is_err());
    }

    #[test]
    fn flags_override_nothing_by_default() {
        let cli = Cli::try_parse_from(["leviathan"]).unwrap();
        assert!(cli.config.is_none() && cli.size.is_none());
        assert!(!cli.no_status && !cli.no_vsync);
    }
}
