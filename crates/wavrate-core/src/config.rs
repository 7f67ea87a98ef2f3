//! Configuration management for wavrate

use crate::engine::TargetRate;
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wavrate_tool::{ExternalTool, ToolBackend};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tool: ToolConfig,
    pub output: OutputConfig,
    pub convert: ConvertConfig,
    pub temp: TempConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Which external tool does the resampling: "sox" or "ffmpeg"
    pub backend: ToolBackend,
    /// Path to sox binary (auto-detected if not set)
    pub sox: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where converted files go (the input's directory if not set)
    pub default_directory: Option<PathBuf>,
    /// Subdirectory created under the output root
    pub dir_name: String,
    /// File name of the archive delivered for uploads
    pub archive_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Target rate token used when none is given: "11k" or "16k"
    pub default_rate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempConfig {
    /// Scratch directory for staged uploads (uses system temp if not set)
    pub directory: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig {
                backend: ToolBackend::Sox,
                sox: None,
                ffmpeg: None,
            },
            output: OutputConfig {
                default_directory: None,
                dir_name: "convert_samplerate".to_string(),
                archive_name: "convert_samplerate.zip".to_string(),
            },
            convert: ConvertConfig {
                default_rate: TargetRate::Hz16000.token().to_string(),
            },
            temp: TempConfig { directory: None },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(path) = Self::default_location() {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::LoadError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // Double underscore so keys like `dir_name` stay reachable
        figment = figment.merge(Env::prefixed("WAVRATE_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/wavrate/config.toml`
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("wavrate/config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_rate()?;

        for (key, value) in [
            ("output.dir_name", &self.output.dir_name),
            ("output.archive_name", &self.output.archive_name),
        ] {
            if !is_plain_file_name(value) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be a plain file name, got {:?}",
                    key, value
                )));
            }
        }
        if self.output.archive_name == self.output.dir_name {
            return Err(ConfigError::InvalidValue(
                "output.archive_name must differ from output.dir_name".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_rate(&self) -> Result<TargetRate, ConfigError> {
        TargetRate::from_token(&self.convert.default_rate)
    }

    /// Locate the configured audio tool
    pub fn audio_tool(&self) -> Result<ExternalTool, ConfigError> {
        let configured = match self.tool.backend {
            ToolBackend::Sox => self.tool.sox.clone(),
            ToolBackend::Ffmpeg => self.tool.ffmpeg.clone(),
        };
        ExternalTool::locate(self.tool.backend, configured)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// Get scratch directory
    pub fn temp_dir(&self) -> PathBuf {
        self.temp.directory.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}
