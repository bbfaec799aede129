//! Preset file format and operations.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use stompbox_effects::{ParamKey, PedalParams, PedalState};

use crate::error::{ConfigError, Result};
use crate::paths;

/// Style a preset is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetCategory {
    /// Rock tones.
    Rock,
    /// Blues tones.
    Blues,
    /// High gain.
    Metal,
    /// Clean tones.
    Clean,
    /// Pads and washes.
    Ambient,
    /// Saved by a player.
    #[default]
    Custom,
}

impl PresetCategory {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            PresetCategory::Rock => "rock",
            PresetCategory::Blues => "blues",
            PresetCategory::Metal => "metal",
            PresetCategory::Clean => "clean",
            PresetCategory::Ambient => "ambient",
            PresetCategory::Custom => "custom",
        }
    }
}

impl fmt::Display for PresetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored board: which pedals are on and where every knob sits.
///
/// Sections that are left out of a file keep their defaults, so a preset
/// only needs to spell out what it changes.
///
/// # TOML Format
///
/// ```toml
/// id = "blues"
/// name = "Blues"
/// category = "blues"
///
/// [pedals]
/// compressor = true
/// drive = true
///
/// [params]
/// volume = 0.75
///
/// [params.drive]
/// gain = 0.4
/// tone = 0.45
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Style category.
    #[serde(default)]
    pub category: PresetCategory,

    /// Save time in Unix milliseconds; absent on factory presets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,

    /// Engaged pedals.
    #[serde(default, rename = "pedals")]
    pub pedal_state: PedalState,

    /// Knob values.
    #[serde(default)]
    pub params: PedalParams,
}

impl Preset {
    /// A preset with every pedal off and default knobs.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: PresetCategory::default(),
            created_at: None,
            pedal_state: PedalState::default(),
            params: PedalParams::default(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: PresetCategory) -> Self {
        self.category = category;
        self
    }

    /// Set the engaged pedals.
    #[must_use]
    pub fn with_state(mut self, state: PedalState) -> Self {
        self.pedal_state = state;
        self
    }

    /// Set the knob values.
    #[must_use]
    pub fn with_params(mut self, params: PedalParams) -> Self {
        self.params = params;
        self
    }

    /// Load and validate a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let preset: Preset = toml::from_str(toml_str)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Parse and validate a preset from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let preset: Preset = serde_json::from_str(json)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Convert the preset to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects out-of-range or non-finite knob values.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("preset '{}'", self.name),
                "id",
                "must not be empty",
            ));
        }
        validate_params(&self.params, &format!("preset '{}'", self.name))
    }

    /// Knobs that differ from the defaults, in [`ParamKey::ALL`] order.
    pub fn changed_params(&self) -> impl Iterator<Item = (ParamKey, f32)> + '_ {
        let defaults = PedalParams::default();
        ParamKey::ALL.into_iter().filter_map(move |key| {
            let value = self.params.get(key);
            (value != defaults.get(key)).then_some((key, value))
        })
    }
}

/// Rejects the first out-of-range knob of `params`.
pub fn validate_params(params: &PedalParams, context: &str) -> Result<()> {
    if let Some(key) = params.out_of_range().next() {
        let desc = key.descriptor();
        return Err(ConfigError::invalid(
            context,
            key.to_string(),
            format!("{} outside {}..={}", params.get(key), desc.min, desc.max),
        ));
    }
    Ok(())
}
