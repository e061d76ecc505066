// Keyconf Settings Module
// User-configurable behaviour of the editor front-end

#![cfg(feature = "pure-rust")]

use std::path::{Path, PathBuf};

use crate::popover::{GeometryConfig, PopoverConfig};
use crate::remap::RemapScope;
use crate::store::{AppFlags, DeviceState, FirmwareVersion};

/// Settings for keyconf
///
/// These settings are loaded from a TOML file (default: ~/.config/keyconf/settings.toml).
/// Missing sections fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    popover: PopoverSettings,
    device: DeviceSettings,
    remap: RemapSettings,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PopoverSettings {
    pub animation_enabled: bool,
    pub side_panel_offset: f64,
    pub key_gap: f64,
    pub width: f64,
}

impl Default for PopoverSettings {
    fn default() -> Self {
        Self {
            animation_enabled: true,
            side_panel_offset: crate::popover::geometry::DEFAULT_SIDE_PANEL_OFFSET,
            key_gap: crate::popover::geometry::DEFAULT_KEY_GAP,
            width: 450.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DeviceSettings {
    pub firmware_version: Option<String>,
    pub running_in_electron: bool,
    pub device_connected: bool,
    pub has_permission: bool,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RemapSettings {
    pub apply_to_all_keymaps: bool,
    pub apply_to_all_layers: bool,
    pub allow_layer_double_tap: bool,
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    popover: Option<PopoverSettings>,

    #[serde(default)]
    device: Option<DeviceSettings>,

    #[serde(default)]
    remap: Option<RemapSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create settings with every default
    pub fn new() -> Self {
        Self {
            popover: PopoverSettings::default(),
            device: DeviceSettings::default(),
            remap: RemapSettings::default(),
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let settings = Self {
            popover: toml_settings.popover.unwrap_or_default(),
            device: toml_settings.device.unwrap_or_default(),
            remap: toml_settings.remap.unwrap_or_default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.popover.width <= 0.0 {
            return Err(SettingsError::InvalidValue(format!(
                "popover.width must be positive, got {}",
                self.popover.width
            )));
        }
        if self.popover.side_panel_offset < 0.0 || self.popover.key_gap < 0.0 {
            return Err(SettingsError::InvalidValue(
                "popover offsets cannot be negative".to_string(),
            ));
        }
        self.firmware_version()?;
        Ok(())
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyconf").join("settings.toml"))
    }

    /// Load from default location (~/.config/keyconf/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    pub fn popover(&self) -> &PopoverSettings {
        &self.popover
    }

    pub fn remap(&self) -> &RemapSettings {
        &self.remap
    }

    pub fn set_animation_enabled(&mut self, enabled: bool) {
        self.popover.animation_enabled = enabled;
    }

    pub fn firmware_version(&self) -> Result<Option<FirmwareVersion>, SettingsError> {
        self.device
            .firmware_version
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: crate::store::StoreError| SettingsError::InvalidValue(e.to_string()))
    }

    pub fn popover_config(&self) -> PopoverConfig {
        PopoverConfig {
            geometry: GeometryConfig {
                side_panel_offset: self.popover.side_panel_offset,
                key_gap: self.popover.key_gap,
            },
        }
    }

    pub fn default_scope(&self) -> RemapScope {
        RemapScope::new(self.remap.apply_to_all_keymaps, self.remap.apply_to_all_layers)
    }

    /// Device part of the application state
    pub fn device_state(&self) -> Result<DeviceState, SettingsError> {
        Ok(DeviceState {
            connected: self.device.device_connected,
            has_permission: self.device.has_permission,
            firmware_version: self.firmware_version()?,
        })
    }

    pub fn app_flags(&self) -> AppFlags {
        AppFlags {
            running_in_electron: self.device.running_in_electron,
        }
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Keyconf Settings
# Place this file at: ~/.config/keyconf/settings.toml

[popover]
animation_enabled = true
# Width of the docked side menu including its margin
side_panel_offset = 265.0
# Space between a key and the popover
key_gap = 7.0
width = 450.0

[device]
# Firmware of the connected keyboard; unlocks macro playback (8.4.3+)
# and extra mouse buttons (8.6.0+)
# firmware_version = "8.6.0"
running_in_electron = false

[remap]
apply_to_all_keymaps = false
apply_to_all_layers = false
allow_layer_double_tap = false
"#
}
