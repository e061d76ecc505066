// Keyconf Keymap Model
// Keymaps, layers, macros and the user configuration that holds them

use serde::{Deserialize, Serialize};

use crate::KeyAction;

/// Number of layers every keymap carries: base, mod, fn, mouse
pub const LAYER_COUNT: usize = 4;

/// Index of the base layer
pub const BASE_LAYER: usize = 0;

/// One layer of a keymap, indexed by key slot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub key_actions: Vec<KeyAction>,
}

impl Layer {
    pub fn with_slots(slots: usize) -> Self {
        Self {
            key_actions: vec![KeyAction::None; slots],
        }
    }

    pub fn get(&self, slot: usize) -> Option<&KeyAction> {
        self.key_actions.get(slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap {
    pub abbreviation: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Keymap {
    /// Create a keymap with `LAYER_COUNT` empty layers of `slots` keys
    pub fn new(abbreviation: impl Into<String>, name: impl Into<String>, slots: usize) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            name: name.into(),
            description: String::new(),
            is_default: false,
            layers: (0..LAYER_COUNT).map(|_| Layer::with_slots(slots)).collect(),
        }
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn key_action(&self, layer: usize, slot: usize) -> Option<&KeyAction> {
        self.layers.get(layer).and_then(|l| l.get(slot))
    }

    /// Number of key slots in the widest layer
    pub fn slot_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.key_actions.len())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    pub id: u8,
    pub name: String,
}

/// Everything the user edits: keymaps in definition order plus macros
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserConfiguration {
    #[serde(default, rename = "keymap")]
    pub keymaps: Vec<Keymap>,
    #[serde(default, rename = "macro")]
    pub macros: Vec<Macro>,
}

#[cfg(feature = "pure-rust")]
#[derive(Debug, thiserror::Error)]
pub enum UserConfigurationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Configuration defines no keymaps")]
    NoKeymaps,

    #[error("Duplicate keymap abbreviation: {0}")]
    DuplicateKeymap(String),
}

#[cfg(feature = "pure-rust")]
impl UserConfiguration {
    pub fn from_toml(content: &str) -> Result<Self, UserConfigurationError> {
        let config: UserConfiguration =
            toml::from_str(content).map_err(|e| UserConfigurationError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, UserConfigurationError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Default location (~/.config/keyconf/keymaps.toml)
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join("keyconf").join("keymaps.toml"))
    }

    pub fn to_toml(&self) -> Result<String, UserConfigurationError> {
        toml::to_string_pretty(self).map_err(|e| UserConfigurationError::TomlSerialize(e.to_string()))
    }

    /// Write through a temporary file so a failed save keeps the old file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), UserConfigurationError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp = path.with_extension("toml.tmp");
        std::fs::write(&temp, self.to_toml()?)?;
        std::fs::rename(&temp, path)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), UserConfigurationError> {
        if self.keymaps.is_empty() {
            return Err(UserConfigurationError::NoKeymaps);
        }
        let mut seen = std::collections::HashSet::new();
        for keymap in &self.keymaps {
            if !seen.insert(keymap.abbreviation.as_str()) {
                return Err(UserConfigurationError::DuplicateKeymap(
                    keymap.abbreviation.clone(),
                ));
            }
        }
        Ok(())
    }
}

impl UserConfiguration {
    /// Built-in configuration used when no file is given: a QWERTY
    /// and a Dvorak keymap over a 4x12 grid plus two macros.
    pub fn builtin() -> Self {
        use crate::{KeystrokeAction, LayerName, SwitchLayerAction, SwitchLayerMode};

        const SLOTS: usize = 48;
        let rows_qwerty = "QWERTYUIOP1234ASDFGHJKL567ZXCVBNM890";
        let rows_dvorak = "PYFGCRL12345AOEUIDHTNS67QJKXBMWVZ890";

        let build = |abbreviation: &str, name: &str, letters: &str| {
            let mut keymap = Keymap::new(abbreviation, name, SLOTS);
            for (slot, ch) in letters.chars().enumerate() {
                if let Some(code) = crate::scancode_from_name(&ch.to_string()) {
                    keymap.layers[0].key_actions[slot] =
                        KeyAction::Keystroke(KeystrokeAction::from_scancode(code));
                }
            }
            keymap.layers[0].key_actions[SLOTS - 3] = KeyAction::SwitchLayer(SwitchLayerAction {
                layer: LayerName::Mod,
                mode: SwitchLayerMode::Hold,
            });
            keymap.layers[0].key_actions[SLOTS - 2] = KeyAction::SwitchLayer(SwitchLayerAction {
                layer: LayerName::Fn,
                mode: SwitchLayerMode::Hold,
            });
            keymap.layers[0].key_actions[SLOTS - 1] = KeyAction::SwitchLayer(SwitchLayerAction {
                layer: LayerName::Mouse,
                mode: SwitchLayerMode::Hold,
            });
            keymap
        };

        let mut qwerty = build("QWR", "QWERTY", rows_qwerty);
        qwerty.is_default = true;
        qwerty.description = "Standard US layout".to_string();
        let dvorak = build("DVR", "Dvorak", rows_dvorak);

        Self {
            keymaps: vec![qwerty, dvorak],
            macros: vec![
                Macro {
                    id: 0,
                    name: "Sign-off".to_string(),
                },
                Macro {
                    id: 1,
                    name: "Lock screen".to_string(),
                },
            ],
        }
    }
}
