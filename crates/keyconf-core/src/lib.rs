// Keyconf Core Library
// Key action model, application store and the popover editor

pub mod action;
pub mod keymap;
pub mod popover;
pub mod remap;
pub mod scancode;
pub mod store;

#[cfg(feature = "pure-rust")]
pub mod settings;

pub use action::{
    KeyAction, KeystrokeAction, KeystrokeType, LayerName, ModifierMask, MouseAction,
    MouseActionParam, PlayMacroAction, SecondaryRoleAction, SwitchKeymapAction, SwitchLayerAction,
    SwitchLayerMode,
};
pub use keymap::{Keymap, Layer, Macro, UserConfiguration, BASE_LAYER, LAYER_COUNT};
pub use popover::{
    compute_placement, compute_tab_availability, AnimationPhase, ConversionError, FixedLayout,
    GeometryConfig, LayoutProvider, Placement, Popover, PopoverChanges, PopoverConfig,
    PopoverEvent, PopoverInputs, PopoverSession, Rect, TabContext, TabEdit, TabEditors,
    TabHeader, TabKind, ANIMATION_DURATION_MS,
};
pub use remap::{KeyActionRemap, RemapScope, RemapTarget};
pub use scancode::{scancode_from_name, scancode_name, Scancode};
pub use store::{AppFlags, AppState, DeviceState, FirmwareVersion, Intent, Store, StoreError};

#[cfg(feature = "pure-rust")]
pub use keymap::UserConfigurationError;

#[cfg(feature = "pure-rust")]
pub use settings::{default_settings_content, Settings, SettingsError};
