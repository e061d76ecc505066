// Keyconf Store
// Application state tree, derived read views and the intents that mutate it

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use parking_lot::RwLock;
use regex::Regex;
use smallvec::SmallVec;

use crate::keymap::{Keymap, Macro, UserConfiguration};
use crate::remap::{KeyActionRemap, RemapTarget};

/// First firmware able to play macros
pub const MACRO_PLAYBACK_MIN_FIRMWARE: FirmwareVersion = FirmwareVersion::new(8, 4, 3);

/// First firmware reporting mouse buttons 4-8
pub const EXTRA_MOUSE_BUTTONS_MIN_FIRMWARE: FirmwareVersion = FirmwareVersion::new(8, 6, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FirmwareVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl FirmwareVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for FirmwareVersion {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static VERSION_RE: OnceLock<Option<Regex>> = OnceLock::new();
        let re = VERSION_RE
            .get_or_init(|| Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)$").ok())
            .as_ref()
            .ok_or_else(|| StoreError::InvalidFirmwareVersion(s.to_string()))?;

        let caps = re
            .captures(s.trim())
            .ok_or_else(|| StoreError::InvalidFirmwareVersion(s.to_string()))?;
        let part = |i: usize| {
            caps[i]
                .parse::<u16>()
                .map_err(|_| StoreError::InvalidFirmwareVersion(s.to_string()))
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub connected: bool,
    pub has_permission: bool,
    pub firmware_version: Option<FirmwareVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppFlags {
    pub running_in_electron: bool,
}

/// The single application state tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub user_configuration: UserConfiguration,
    pub app: AppFlags,
    pub device: DeviceState,
    /// Key slot the open popover edits, if any
    pub remap_target: Option<RemapTarget>,
}

/// Option entry for keymap pickers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectOptionData {
    pub label: String,
    pub value: String,
}

pub fn get_user_configuration(state: &AppState) -> &UserConfiguration {
    &state.user_configuration
}

pub fn get_keymaps(state: &AppState) -> &[Keymap] {
    &state.user_configuration.keymaps
}

pub fn get_keymap_options(state: &AppState) -> Vec<SelectOptionData> {
    get_keymaps(state)
        .iter()
        .map(|keymap| SelectOptionData {
            label: keymap.name.clone(),
            value: keymap.abbreviation.clone(),
        })
        .collect()
}

pub fn get_macros(state: &AppState) -> &[Macro] {
    &state.user_configuration.macros
}

pub fn macro_playback_supported(state: &AppState) -> bool {
    state
        .device
        .firmware_version
        .is_some_and(|v| v >= MACRO_PLAYBACK_MIN_FIRMWARE)
}

pub fn extra_mouse_buttons_supported(state: &AppState) -> bool {
    state
        .device
        .firmware_version
        .is_some_and(|v| v >= EXTRA_MOUSE_BUTTONS_MIN_FIRMWARE)
}

pub fn running_in_electron(state: &AppState) -> bool {
    state.app.running_in_electron
}

/// Outside the desktop shell there is no device to lose
pub fn device_connected(state: &AppState) -> bool {
    !running_in_electron(state) || state.device.connected
}

pub fn has_device_permission(state: &AppState) -> bool {
    !running_in_electron(state) || state.device.has_permission
}

/// Write requests accepted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Remember which key slot the popover was opened for
    OpenRemap(RemapTarget),
    /// Apply a confirmed popover edit to the pending target
    FinalizeRemap(KeyActionRemap),
    /// Drop the pending target and resume normal interaction
    CancelRemap,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("No key is being remapped")]
    NoRemapTarget,

    #[error("Unknown keymap: {0}")]
    UnknownKeymap(String),

    #[error("Layer {layer} out of range for keymap {keymap}")]
    LayerOutOfRange { keymap: String, layer: usize },

    #[error("Key slot {slot} out of range on layer {layer} of keymap {keymap}")]
    SlotOutOfRange {
        keymap: String,
        layer: usize,
        slot: usize,
    },

    #[error("Invalid firmware version: {0}")]
    InvalidFirmwareVersion(String),
}

/// Apply an intent to the state tree
pub fn reduce(state: &mut AppState, intent: Intent) -> Result<(), StoreError> {
    match intent {
        Intent::OpenRemap(target) => {
            state.remap_target = Some(target);
            Ok(())
        }
        Intent::FinalizeRemap(remap) => {
            let target = state.remap_target.take().ok_or(StoreError::NoRemapTarget)?;
            let result = apply_remap(&mut state.user_configuration, &target, &remap);
            if result.is_err() {
                state.remap_target = Some(target);
            }
            result
        }
        Intent::CancelRemap => {
            state.remap_target = None;
            Ok(())
        }
    }
}

fn apply_remap(
    config: &mut UserConfiguration,
    target: &RemapTarget,
    remap: &KeyActionRemap,
) -> Result<(), StoreError> {
    let source = config
        .keymaps
        .iter()
        .find(|k| k.abbreviation == target.keymap_abbreviation)
        .ok_or_else(|| StoreError::UnknownKeymap(target.keymap_abbreviation.clone()))?;
    let source_layers = source.layers.len();
    if target.layer >= source_layers {
        return Err(StoreError::LayerOutOfRange {
            keymap: source.abbreviation.clone(),
            layer: target.layer,
        });
    }

    let layers: SmallVec<[usize; 4]> = if remap.scope.apply_to_all_layers {
        (0..source_layers).collect()
    } else {
        SmallVec::from_elem(target.layer, 1)
    };

    // All slots are checked before the first write
    let keymaps = config.keymaps.iter().enumerate().filter(|(_, k)| {
        remap.scope.apply_to_all_keymaps || k.abbreviation == target.keymap_abbreviation
    });
    let mut writes: Vec<(usize, usize)> = Vec::new();
    for (keymap_index, keymap) in keymaps {
        for &layer in &layers {
            match keymap.layers.get(layer) {
                Some(l) if target.slot < l.key_actions.len() => writes.push((keymap_index, layer)),
                Some(_) => {
                    return Err(StoreError::SlotOutOfRange {
                        keymap: keymap.abbreviation.clone(),
                        layer,
                        slot: target.slot,
                    })
                }
                // Keymaps with fewer layers are skipped when remapping across keymaps
                None => {}
            }
        }
    }

    for (keymap_index, layer) in writes {
        config.keymaps[keymap_index].layers[layer].key_actions[target.slot] = remap.action.clone();
    }
    log::debug!(
        "Remapped {}:{}:{} to {} ({:?})",
        target.keymap_abbreviation,
        target.layer,
        target.slot,
        remap.action,
        remap.scope
    );
    Ok(())
}

/// Holder of the state tree
#[derive(Debug, Default)]
pub struct Store {
    state: RwLock<AppState>,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Evaluate a selector against the current state
    pub fn select<T>(&self, selector: impl FnOnce(&AppState) -> T) -> T {
        let state = self.state.read();
        selector(&*state)
    }

    pub fn dispatch(&self, intent: Intent) -> Result<(), StoreError> {
        let mut state = self.state.write();
        reduce(&mut state, intent)
    }

    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remap::RemapScope;
    use crate::{KeyAction, KeystrokeAction};

    fn sample_state() -> AppState {
        AppState {
            user_configuration: UserConfiguration {
                keymaps: vec![Keymap::new("QWR", "QWERTY", 4), Keymap::new("DVR", "Dvorak", 4)],
                macros: vec![],
            },
            ..AppState::default()
        }
    }

    fn target(layer: usize, slot: usize) -> RemapTarget {
        RemapTarget {
            keymap_abbreviation: "QWR".to_string(),
            layer,
            slot,
        }
    }

    fn remap(scope: RemapScope) -> KeyActionRemap {
        KeyActionRemap {
            scope,
            action: KeyAction::Keystroke(KeystrokeAction::from_scancode(4u16)),
        }
    }

    #[test]
    fn test_keymap_options_follow_keymap_order() {
        let state = sample_state();
        let options = get_keymap_options(&state);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "QWR");
        assert_eq!(options[0].label, "QWERTY");
        assert_eq!(options[1].value, "DVR");
    }

    #[test]
    fn test_capabilities_follow_firmware_version() {
        let mut state = sample_state();
        assert!(!macro_playback_supported(&state));
        assert!(!extra_mouse_buttons_supported(&state));

        state.device.firmware_version = Some(FirmwareVersion::new(8, 4, 3));
        assert!(macro_playback_supported(&state));
        assert!(!extra_mouse_buttons_supported(&state));

        state.device.firmware_version = Some(FirmwareVersion::new(9, 0, 0));
        assert!(macro_playback_supported(&state));
        assert!(extra_mouse_buttons_supported(&state));
    }

    #[test]
    fn test_firmware_version_parse() {
        assert_eq!("8.6.0".parse::<FirmwareVersion>(), Ok(FirmwareVersion::new(8, 6, 0)));
        assert_eq!("v10.2.1".parse::<FirmwareVersion>(), Ok(FirmwareVersion::new(10, 2, 1)));
        assert!(matches!(
            "8.6".parse::<FirmwareVersion>(),
            Err(StoreError::InvalidFirmwareVersion(_))
        ));
    }

    #[test]
    fn test_device_selectors_outside_electron() {
        let mut state = sample_state();
        assert!(device_connected(&state));
        assert!(has_device_permission(&state));

        state.app.running_in_electron = true;
        assert!(!device_connected(&state));
        state.device.connected = true;
        assert!(device_connected(&state));
        assert!(!has_device_permission(&state));
    }

    #[test]
    fn test_finalize_remap_single_slot() {
        let store = Store::new(sample_state());
        store.dispatch(Intent::OpenRemap(target(1, 2))).unwrap();
        store
            .dispatch(Intent::FinalizeRemap(remap(RemapScope::default())))
            .unwrap();

        let state = store.snapshot();
        assert!(state.remap_target.is_none());
        let qwr = &state.user_configuration.keymaps[0];
        assert!(matches!(qwr.key_action(1, 2), Some(KeyAction::Keystroke(_))));
        assert_eq!(qwr.key_action(0, 2), Some(&KeyAction::None));
        assert_eq!(
            state.user_configuration.keymaps[1].key_action(1, 2),
            Some(&KeyAction::None)
        );
    }

    #[test]
    fn test_finalize_remap_all_layers_and_keymaps() {
        let store = Store::new(sample_state());
        store.dispatch(Intent::OpenRemap(target(0, 1))).unwrap();
        store
            .dispatch(Intent::FinalizeRemap(remap(RemapScope::new(true, true))))
            .unwrap();

        let state = store.snapshot();
        for keymap in &state.user_configuration.keymaps {
            for layer in 0..keymap.layers.len() {
                assert!(matches!(keymap.key_action(layer, 1), Some(KeyAction::Keystroke(_))));
            }
        }
    }

    #[test]
    fn test_finalize_without_target_fails() {
        let store = Store::new(sample_state());
        assert_eq!(
            store.dispatch(Intent::FinalizeRemap(remap(RemapScope::default()))),
            Err(StoreError::NoRemapTarget)
        );
    }

    #[test]
    fn test_out_of_range_slot_keeps_target() {
        let store = Store::new(sample_state());
        store.dispatch(Intent::OpenRemap(target(0, 99))).unwrap();
        assert!(matches!(
            store.dispatch(Intent::FinalizeRemap(remap(RemapScope::default()))),
            Err(StoreError::SlotOutOfRange { slot: 99, .. })
        ));
        assert_eq!(store.select(|s| s.remap_target.clone()), Some(target(0, 99)));
    }

    #[test]
    fn test_cancel_clears_target() {
        let store = Store::new(sample_state());
        store.dispatch(Intent::OpenRemap(target(0, 0))).unwrap();
        store.dispatch(Intent::CancelRemap).unwrap();
        assert!(store.select(|s| s.remap_target.is_none()));
        assert_eq!(store.select(|s| get_user_configuration(s).clone()),
            sample_state().user_configuration
        );
    }
}
