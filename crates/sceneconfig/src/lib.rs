use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneConfig {
    pub version: u32,
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub transition: TransitionSection,
    #[serde(default)]
    pub sweep: SweepSection,
    #[serde(default)]
    pub clock: ClockSection,
}

/// The two images being transitioned between.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Sources {
    pub from: Option<PathBuf>,
    pub to: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WindowSection {
    /// `WIDTHxHEIGHT` in physical pixels.
    pub size: Option<String>,
    pub fps: Option<f32>,
    #[serde(default, deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    pub color_space: Option<ColorSpaceSetting>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransitionSection {
    pub progress: Option<f32>,
    pub step: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SweepSection {
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,
    pub curve: Option<SweepCurveSetting>,
    pub mode: Option<SweepModeSetting>,
    #[serde(default)]
    pub autostart: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClockSection {
    pub time_step: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    Auto,
    Gamma,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepCurveSetting {
    Linear,
    Smoothstep,
    EaseInOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepModeSetting {
    Once,
    Loop,
    Pingpong,
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
            if v.is_nan() || v.is_sign_negative() || v.is_infinite() {
                return Err(E::custom("duration must be a finite, non-negative number"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("duration {v} is out of range: {err}")))
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

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Accepts `auto`, `off`, or a sample count (`2`, `4`, `8`, `16`).
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

/// Parses `WIDTHxHEIGHT` (either `x` or `X`), rejecting zero dimensions.
pub fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let trimmed = raw.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("size '{trimmed}' must look like WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size '{trimmed}' must be non-zero in both dimensions"));
    }
    Ok((width, height))
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads, validates, and anchors relative source paths to the directory
    /// containing `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&input)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for slot in [&mut self.sources.from, &mut self.sources.to] {
            if let Some(path) = slot.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    /// Parsed `[window] size`, if present. Only valid after [`validate`](Self::validate).
    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.window
            .size
            .as_deref()
            .and_then(|raw| parse_size(raw).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(size) = &self.window.size {
            parse_size(size).map_err(|err| ConfigError::Invalid(format!("window.size: {err}")))?;
        }

        if let Some(fps) = self.window.fps {
            if !(fps >= 0.0) {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        if let Some(progress) = self.transition.progress {
            if !(0.0..=1.0).contains(&progress) {
                return Err(ConfigError::Invalid(format!(
                    "transition.progress {progress} must lie within [0, 1]"
                )));
            }
        }

        if let Some(step) = self.transition.step {
            if !(step > 0.0 && step <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "transition.step {step} must lie within (0, 1]"
                )));
            }
        }

        if let Some(duration) = self.sweep.duration {
            if duration.is_zero() {
                return Err(ConfigError::Invalid(
                    "sweep.duration must be greater than zero".into(),
                ));
            }
        }

        if let Some(time_step) = self.clock.time_step {
            if !(time_step > 0.0) || !time_step.is_finite() {
                return Err(ConfigError::Invalid(
                    "clock.time_step must be a positive number".into(),
                ));
            }
        }

        for (name, slot) in [("from", &self.sources.from), ("to", &self.sources.to)] {
            if let Some(path) = slot {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "sources.{name} may not be empty"
                    )));
                }
            }
        }

        Ok(())
    }
}
