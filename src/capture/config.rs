//! Stream session configuration.
//!
//! Settings are fixed at session start. The downsample factor must match
//! the one set on the acquisition hub, otherwise every field offset is
//! wrong.

use crate::geometry::{GeometryError, StreamGeometry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a streaming session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Downsample factor set on the acquisition hub.
    pub downsample_factor: u32,
    /// Only deliver frames captured while a recording is running.
    pub sync_with_recording: bool,
    /// Store delivered pixel regions to a raw file.
    pub file_storage: bool,
    /// Directory for raw storage files.
    pub storage_dir: PathBuf,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            downsample_factor: 2,
            sync_with_recording: false,
            file_storage: false,
            storage_dir: PathBuf::from("."),
        }
    }
}

impl StreamConfig {
    /// Creates a configuration with the given downsample factor.
    pub fn with_downsample(downsample_factor: u32) -> Self {
        Self {
            downsample_factor,
            ..Default::default()
        }
    }

    /// Validates the configuration, returning the geometry it implies.
    pub fn validate(&self) -> Result<StreamGeometry, ConfigError> {
        Ok(StreamGeometry::compute(self.downsample_factor)?)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidFactor(#[from] GeometryError),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Run until interrupted (true) or stop after `frame_count` frames.
    pub continuous: bool,
    /// Number of frames to read if not continuous.
    pub frame_count: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            frame_count: 100,
        }
    }
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.stream.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = StreamConfig::default();
        let geometry = config.validate().unwrap();
        assert_eq!(geometry.downsample_factor(), 2);
    }

    #[test]
    fn test_bad_factor_invalid() {
        let config = StreamConfig::with_downsample(3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFactor(GeometryError::InvalidFactor {
                factor: 3,
                ..
            }))
        ));
    }

    #[test]
    fn test_parse_toml() {
        let config = FileConfig::from_toml(
            r#"
            [stream]
            downsample_factor = 4
            sync_with_recording = true

            [output]
            continuous = true
            "#,
        )
        .unwrap();

        assert_eq!(config.stream.downsample_factor, 4);
        assert!(config.stream.sync_with_recording);
        assert!(!config.stream.file_storage);
        assert!(config.output.continuous);
        assert_eq!(config.output.frame_count, 100);
        assert_eq!(config.metrics.port, 9090);
    }

    #[test]
    fn test_parse_rejects_bad_factor() {
        let result = FileConfig::from_toml("[stream]\ndownsample_factor = 6\n");
        assert!(matches!(result, Err(ConfigError::InvalidFactor(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = FileConfig::from_toml("[stream\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
