// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! On-disk configuration for the `dtmfd` binary: the pipeline tunables plus
//! the capture device settings, merged with CLI overrides in `main.rs`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dtmf_core::PipelineConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Trait for loading configuration files from a conventional search path
/// (current directory, then the XDG config dir, then `/etc`).
pub trait ConfigFile: Sized + Default + serde::de::DeserializeOwned {
    fn config_filename() -> &'static str;

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(Self::config_filename())];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("dtmfd").join(Self::config_filename()));
        }
        paths.push(PathBuf::from("/etc/dtmfd").join(Self::config_filename()));
        paths
    }

    /// Search the default paths in order and load the first one found.
    /// Returns `(Self::default(), None)` if none exist.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in Self::default_search_paths() {
            if path.exists() {
                let cfg = Self::load_from_file(&path)?;
                return Ok((cfg, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }
}

/// Audio capture device settings, independent of the pipeline's own
/// detection tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Capture device name, or `None` for the host's default input device.
    pub device: Option<String>,
    /// Capture sample rate in Hz. The pipeline derives its window size and
    /// Goertzel coefficients from this value.
    pub sample_rate: u32,
    /// Log level string passed to `tracing_subscriber`, e.g. "info", "debug".
    pub log_level: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: 8000,
            log_level: None,
        }
    }
}

/// Top-level `dtmfd.toml` document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub pipeline: PipelineConfig,
}

impl ConfigFile for AppConfig {
    fn config_filename() -> &'static str {
        "dtmfd.toml"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.capture.sample_rate, config.capture.sample_rate);
        assert_eq!(parsed.pipeline.window_ms, config.pipeline.window_ms);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let (config, path) = AppConfig::load_from_default_paths().expect("load");
        if path.is_none() {
            assert_eq!(config.capture.sample_rate, 8000);
        }
    }
}
