// Keyconf Remap Requests
// What a confirmed popover edit hands back to the application

use serde::{Deserialize, Serialize};

use crate::KeyAction;

/// Flags controlling how widely a confirmed edit is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RemapScope {
    #[serde(default)]
    pub apply_to_all_keymaps: bool,
    #[serde(default)]
    pub apply_to_all_layers: bool,
}

impl RemapScope {
    pub fn new(apply_to_all_keymaps: bool, apply_to_all_layers: bool) -> Self {
        Self {
            apply_to_all_keymaps,
            apply_to_all_layers,
        }
    }
}

/// Payload of the popover's `remap` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyActionRemap {
    pub scope: RemapScope,
    pub action: KeyAction,
}

/// The key slot a remap applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemapTarget {
    pub keymap_abbreviation: String,
    pub layer: usize,
    pub slot: usize,
}
