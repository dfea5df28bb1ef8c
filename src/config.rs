//! Layered configuration: CLI > environment > config file > defaults
//!
//! The command-line layer is applied by the binary; this module covers the rest.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SpliceError, SpliceResult};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "splice.toml";

pub const ENV_LOG_LEVEL: &str = "SPLICE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "SPLICE_LOG_FORMAT";
pub const ENV_OUTPUT_DIR: &str = "SPLICE_OUTPUT_DIR";
pub const ENV_DEFAULT_DURATION: &str = "SPLICE_DEFAULT_DURATION";

/// Subtitle styling applied during burn-in
pub const DEFAULT_SUBTITLE_STYLE: &str =
    "FontName=Arial,FontSize=24,PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,BorderStyle=1,Outline=2";

/// Optional builder stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderFeatures {
    /// Insert editor gaps into the timeline
    pub gaps: bool,
    /// Allow a soundtrack routed separately from the video segments
    pub audio_replacement: bool,
    /// Emit preset and thread flags
    pub encoding: bool,
}

impl Default for BuilderFeatures {
    fn default() -> Self {
        Self {
            gaps: true,
            audio_replacement: true,
            encoding: true,
        }
    }
}

/// Settings for command assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub features: BuilderFeatures,
    /// Seconds assumed for inputs that carry no duration
    pub default_input_duration: f64,
    /// `force_style` value for subtitle burn-in
    pub subtitle_force_style: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            features: BuilderFeatures::default(),
            default_input_duration: 5.0,
            subtitle_force_style: DEFAULT_SUBTITLE_STYLE.to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    pub builder: BuilderConfig,
    pub logging: LoggingConfig,
    /// Directory the output file is placed in
    pub output_dir: Option<PathBuf>,
}

impl SpliceConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> SpliceResult<Self> {
        toml::from_str(content).map_err(|e| SpliceError::Config {
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> SpliceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SpliceError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SpliceError::Config { message } => SpliceError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Config file `load` reads: the explicit path, else `./splice.toml` if present
    pub fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.is_file()),
        }
    }

    /// Load file and environment layers
    ///
    /// An explicit path must exist; the default `splice.toml` is optional.
    /// Runs before logging is initialized, so it logs nothing itself.
    pub fn load(explicit: Option<&Path>) -> SpliceResult<Self> {
        let mut config = match Self::config_file(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SPLICE_*` environment overrides
    pub fn apply_env(&mut self) -> SpliceResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> SpliceResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = LogLevel::parse(&value).ok_or_else(|| SpliceError::Config {
                message: format!("{}: unknown log level '{}'", ENV_LOG_LEVEL, value),
            })?;
        }

        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = LogFormat::parse(&value).ok_or_else(|| SpliceError::Config {
                message: format!("{}: unknown log format '{}'", ENV_LOG_FORMAT, value),
            })?;
        }

        if let Some(value) = lookup(ENV_OUTPUT_DIR) {
            if !value.is_empty() {
                self.output_dir = Some(PathBuf::from(value));
            }
        }

        if let Some(value) = lookup(ENV_DEFAULT_DURATION) {
            self.builder.default_input_duration =
                value.trim().parse().map_err(|_| SpliceError::Config {
                    message: format!("{}: not a number: '{}'", ENV_DEFAULT_DURATION, value),
                })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> SpliceResult<()> {
        let duration = self.builder.default_input_duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SpliceError::Config {
                message: format!("default_input_duration must be positive, got {}", duration),
            });
        }
        Ok(())
    }
}
