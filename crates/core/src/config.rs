use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::button::{ButtonColor, ButtonFlags, ButtonSetting};
use crate::encoder::{default_settings, SysexConfig};
use crate::error::SysexError;
use crate::protocol::{BUTTONS_PER_BOARD, DATA_MAX, DEFAULT_SYSEX_FILE};

/// Default settings file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "buzzr.json";

/// Generator settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub num_boards: usize,
    pub output: PathBuf,
    /// Per-button changes applied on top of the factory defaults
    pub overrides: Vec<ButtonOverride>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            num_boards: 1,
            output: PathBuf::from(DEFAULT_SYSEX_FILE),
            overrides: Vec::new(),
        }
    }
}

/// Replacement values for one button. Unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonOverride {
    pub index: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl ButtonOverride {
    fn apply(&self, setting: &mut ButtonSetting) -> Result<(), SysexError> {
        if let Some(channel) = self.channel {
            setting.channel = channel;
        }
        if let Some(cc) = self.cc {
            setting.cc = cc;
        }
        if let Some(flags) = self.flags {
            setting.flags = ButtonFlags::from_bits(flags)?;
        }
        if let Some(color) = self.color {
            setting.color = ButtonColor::from_byte(color)?;
        }
        Ok(())
    }
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: GeneratorSettings,
}

/// Loads, validates and saves generator settings.
///
/// A missing file is not an error; the factory defaults are used instead.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: GeneratorSettings,
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to 'buzzr.json' in the current working directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self {
            config_path,
            settings: GeneratorSettings::default(),
        }
    }

    /// Load settings from the configuration file, if there is one.
    pub fn load(&mut self) -> Result<GeneratorSettings, ConfigError> {
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "No settings file at {}, using defaults",
                    self.config_path.display()
                );
                return Ok(self.settings.clone());
            }
            Err(e) => return Err(ConfigError::ReadError(e.to_string())),
        };

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match generator version {}",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        log::info!("Loaded settings from {}", self.config_path.display());
        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Update settings and save to file
    pub fn update_settings(&mut self, settings: GeneratorSettings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings).map_err(ConfigError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Validate settings, collecting every problem found.
    pub fn validate_settings(settings: &GeneratorSettings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(1..=SysexConfig::MAX_BOARDS).contains(&settings.num_boards) {
            errors.push(format!(
                "num_boards must be between 1 and {}",
                SysexConfig::MAX_BOARDS
            ));
        }

        if settings.output.as_os_str().is_empty() {
            errors.push("output must not be empty".to_string());
        }

        let button_count = settings.num_boards.saturating_mul(BUTTONS_PER_BOARD);
        for o in &settings.overrides {
            if o.index as usize >= button_count {
                errors.push(format!(
                    "override index {} is beyond the last button {}",
                    o.index,
                    button_count.saturating_sub(1)
                ));
            }
            if let Some(channel) = o.channel {
                if channel > ButtonSetting::CHANNEL_MAX {
                    errors.push(format!(
                        "button {}: channel must be between 0 and {}",
                        o.index,
                        ButtonSetting::CHANNEL_MAX
                    ));
                }
            }
            if let Some(cc) = o.cc {
                if cc > DATA_MAX {
                    errors.push(format!(
                        "button {}: cc must be between 0 and {}",
                        o.index, DATA_MAX
                    ));
                }
            }
            if let Some(flags) = o.flags {
                if ButtonFlags::from_bits(flags).is_err() {
                    errors.push(format!(
                        "button {}: flags {:#04x} has undefined bits",
                        o.index, flags
                    ));
                }
            }
            if let Some(color) = o.color {
                if color > ButtonColor::MAX {
                    errors.push(format!(
                        "button {}: color must be between 0 and {:#04x}",
                        o.index,
                        ButtonColor::MAX
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Protocol configuration for the current settings.
    pub fn sysex_config(&self) -> Result<SysexConfig, SysexError> {
        SysexConfig::new(self.settings.num_boards)
    }

    /// Factory defaults with the configured overrides applied, in index order.
    pub fn button_settings(&self, config: &SysexConfig) -> Result<Vec<ButtonSetting>, SysexError> {
        let mut settings = default_settings(config)?;
        for o in &self.settings.overrides {
            let setting =
                settings
                    .get_mut(o.index as usize)
                    .ok_or_else(|| SysexError::FieldOutOfRange {
                        field: "index",
                        value: o.index as usize,
                        max: config.button_count().saturating_sub(1),
                    })?;
            o.apply(setting)?;
        }
        Ok(settings)
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
    #[error("Config validation errors: {}", .0.join(", "))]
    ValidationError(Vec<String>),
}
