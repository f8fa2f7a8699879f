//! Configuration file handling for discretize.
//!
//! Loads configuration from `~/.config/discretize/config.toml` or a custom path.
//! Every value is optional; command-line flags take precedence, then the file,
//! then the built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::raster::ResampleMethod;

/// Configuration file structure for discretize.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub quantization: QuantizationConfig,
    #[serde(default)]
    pub volume: VolumeConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    pub rows: Option<i64>,
    pub cols: Option<i64>,
    pub method: Option<ResampleMethod>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuantizationConfig {
    pub rows: Option<i64>,
    pub cols: Option<i64>,
    pub colors: Option<i64>,
    pub cell_size: Option<i64>,
    pub method: Option<ResampleMethod>,
    /// TrueType/OpenType font for labels; the bitmap font is used if absent.
    pub font: Option<PathBuf>,
    pub font_size: Option<f32>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VolumeConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub footprint: Option<f32>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    pub num_samples: Option<i64>,
    pub threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::read(&path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Load configuration from a path that must exist.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read config file '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("discretize").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/discretize/config.toml")
        })
}

/// Contents written by `discretize config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# discretize configuration

[sampling]
# Target grid size for the pixelation view
rows = 10
cols = 10
# Shrink rule: nearest or bilinear (re-expansion is always nearest)
method = "nearest"

[quantization]
rows = 10
cols = 10
# Number of levels, clamped to 2-256
colors = 16
# Side of each annotated cell in pixels
cell_size = 60
method = "bilinear"
# Scalable label font; the built-in bitmap font is used when unset or unreadable
# font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
font_size = 16.0

[volume]
width = 800
height = 600
# Bar side length in grid units
footprint = 0.8

[audio]
# Samples shown in binary, clamped to 1-1000
num_samples = 20
# Leading samples at or below this amplitude are skipped
threshold = 0.001

[output]
dir = "processed"
"#;
