//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use squeeze_dynamics::Compressor;
use std::path::Path;

use crate::error::ConfigError;
use crate::settings::CompressorSettings;

/// A named, described set of compressor settings.
///
/// # TOML Format
///
/// ```toml
/// name = "Vocal"
/// description = "Smooth RMS leveling for vocals"
///
/// [settings]
/// threshold_db = -20.0
/// ratio = 3.0
/// detector = "rms"
///
/// [settings.sidechain]
/// hpf_hz = 100.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Compressor parameters; missing fields take their defaults.
    #[serde(default)]
    pub settings: CompressorSettings,
}

impl Preset {
    /// Create a preset with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            settings: CompressorSettings::default(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: CompressorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the settings and applies them to `comp`.
    pub fn apply_to(&self, comp: &mut Compressor) -> Result<(), ConfigError> {
        self.settings.apply_to(comp)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
