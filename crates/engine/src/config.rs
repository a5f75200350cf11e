use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::reload::{ShaderPaths, DEFAULT_RELOAD_INTERVAL};

/// Longest reload debounce accepted from configuration.
pub const MAX_RELOAD_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub shaders: ShaderConfig,
    pub reload: ReloadConfig,
    pub track: TrackConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub primary: PathBuf,
    pub post: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("src/shaders/fragment.frag"),
            post: PathBuf::from("src/shaders/post.frag"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReloadConfig {
    /// Minimum time between two reload attempts of the same shader.
    #[serde(
        default = "default_reload_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub interval: Duration,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RELOAD_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TrackConfig {
    /// WAV file whose header provides the track length.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Explicit track length; takes precedence over `path`.
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub length: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub status_line: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { status_line: true }
    }
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn shader_paths(&self) -> ShaderPaths {
        ShaderPaths::new(self.shaders.primary.clone(), self.shaders.post.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shaders.primary.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "shaders.primary must not be empty".into(),
            ));
        }
        if self.shaders.post.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("shaders.post must not be empty".into()));
        }
        if self.reload.interval > MAX_RELOAD_INTERVAL {
            return Err(ConfigError::Invalid(format!(
                "reload.interval of {} exceeds the maximum of {}",
                humantime::format_duration(self.reload.interval),
                humantime::format_duration(MAX_RELOAD_INTERVAL)
            )));
        }
        Ok(())
    }
}

fn default_reload_interval() -> Duration {
    DEFAULT_RELOAD_INTERVAL
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or(DEFAULT_RELOAD_INTERVAL))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}
