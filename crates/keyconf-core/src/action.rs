// Keyconf Key Actions
// The closed set of actions a keyboard key can be assigned

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::Scancode;

/// What a keystroke action emits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeystrokeType {
    #[default]
    Basic,
    ShortMedia,
    LongMedia,
    System,
}

/// Bit set of the eight HID modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierMask(u8);

impl ModifierMask {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const LEFT_SHIFT: u8 = 1 << 1;
    pub const LEFT_ALT: u8 = 1 << 2;
    pub const LEFT_SUPER: u8 = 1 << 3;
    pub const RIGHT_CTRL: u8 = 1 << 4;
    pub const RIGHT_SHIFT: u8 = 1 << 5;
    pub const RIGHT_ALT: u8 = 1 << 6;
    pub const RIGHT_SUPER: u8 = 1 << 7;

    const NAMES: [(u8, &'static str); 8] = [
        (Self::LEFT_CTRL, "LCtrl"),
        (Self::LEFT_SHIFT, "LShift"),
        (Self::LEFT_ALT, "LAlt"),
        (Self::LEFT_SUPER, "LSuper"),
        (Self::RIGHT_CTRL, "RCtrl"),
        (Self::RIGHT_SHIFT, "RShift"),
        (Self::RIGHT_ALT, "RAlt"),
        (Self::RIGHT_SUPER, "RSuper"),
    ];

    pub fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit == bit
    }

    pub fn toggle(&mut self, bit: u8) {
        self.0 ^= bit;
    }

    /// Names of the set modifiers, left side first
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(bit, _)| self.contains(*bit))
            .map(|(_, name)| name)
    }
}

/// Action performed while a dual-role key is held.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SecondaryRoleAction {
    LeftCtrl,
    LeftShift,
    LeftAlt,
    LeftSuper,
    RightCtrl,
    RightShift,
    RightAlt,
    RightSuper,
    Mod,
    Fn,
    Mouse,
}

impl SecondaryRoleAction {
    /// True for the roles that switch to another layer while held
    pub fn is_layer_switch(self) -> bool {
        matches!(
            self,
            SecondaryRoleAction::Mod | SecondaryRoleAction::Fn | SecondaryRoleAction::Mouse
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeystrokeAction {
    #[serde(default)]
    pub keystroke_type: KeystrokeType,
    #[serde(default)]
    pub scancode: Option<Scancode>,
    #[serde(default)]
    pub modifier_mask: ModifierMask,
    #[serde(default)]
    pub secondary_role: Option<SecondaryRoleAction>,
}

impl KeystrokeAction {
    pub fn from_scancode(scancode: impl Into<Scancode>) -> Self {
        Self {
            scancode: Some(scancode.into()),
            ..Self::default()
        }
    }

    pub fn with_modifiers(mut self, mask: ModifierMask) -> Self {
        self.modifier_mask = mask;
        self
    }

    pub fn with_secondary_role(mut self, role: SecondaryRoleAction) -> Self {
        self.secondary_role = Some(role);
        self
    }

    pub fn has_scancode(&self) -> bool {
        self.scancode.is_some()
    }

    pub fn has_active_modifier(&self) -> bool {
        !self.modifier_mask.is_empty()
    }

    /// A keystroke must emit at least a key or a modifier
    pub fn is_complete(&self) -> bool {
        self.has_scancode() || self.has_active_modifier()
    }

    /// Dual-role keystrokes whose hold action switches layers
    pub fn has_layer_switch_secondary_role(&self) -> bool {
        self.secondary_role.is_some_and(SecondaryRoleAction::is_layer_switch)
    }
}

impl fmt::Display for KeystrokeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = self.modifier_mask.names().collect();
        if let Some(scancode) = self.scancode {
            parts.push(scancode.name());
        }
        if parts.is_empty() {
            write!(f, "(empty)")?;
        } else {
            write!(f, "{}", parts.join("+"))?;
        }
        if let Some(role) = self.secondary_role {
            write!(f, " / {}", role)?;
        }
        Ok(())
    }
}

/// Layers a key can switch to. The base layer is never a switch target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayerName {
    #[default]
    Mod,
    Fn,
    Mouse,
}

impl LayerName {
    /// Index of the layer within a keymap (0 is the base layer)
    pub fn index(self) -> usize {
        match self {
            LayerName::Mod => 1,
            LayerName::Fn => 2,
            LayerName::Mouse => 3,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SwitchLayerMode {
    #[default]
    Hold,
    Toggle,
    HoldAndDoubleTapToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SwitchLayerAction {
    pub layer: LayerName,
    #[serde(default)]
    pub mode: SwitchLayerMode,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MouseActionParam {
    LeftClick,
    MiddleClick,
    RightClick,
    Button4,
    Button5,
    Button6,
    Button7,
    Button8,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    Accelerate,
    Decelerate,
}

impl MouseActionParam {
    /// Buttons beyond the standard three need firmware support
    pub fn is_extra_button(self) -> bool {
        matches!(
            self,
            MouseActionParam::Button4
                | MouseActionParam::Button5
                | MouseActionParam::Button6
                | MouseActionParam::Button7
                | MouseActionParam::Button8
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseAction {
    pub action: MouseActionParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayMacroAction {
    pub macro_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchKeymapAction {
    pub keymap_abbreviation: String,
}

/// The action assigned to a single key slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KeyAction {
    Keystroke(KeystrokeAction),
    SwitchLayer(SwitchLayerAction),
    Mouse(MouseAction),
    PlayMacro(PlayMacroAction),
    SwitchKeymap(SwitchKeymapAction),
    #[default]
    None,
}

impl KeyAction {
    pub fn is_none(&self) -> bool {
        matches!(self, KeyAction::None)
    }

    pub fn as_keystroke(&self) -> Option<&KeystrokeAction> {
        match self {
            KeyAction::Keystroke(keystroke) => Some(keystroke),
            _ => None,
        }
    }
}

impl From<KeystrokeAction> for KeyAction {
    fn from(action: KeystrokeAction) -> Self {
        KeyAction::Keystroke(action)
    }
}

impl From<SwitchLayerAction> for KeyAction {
    fn from(action: SwitchLayerAction) -> Self {
        KeyAction::SwitchLayer(action)
    }
}

impl From<MouseAction> for KeyAction {
    fn from(action: MouseAction) -> Self {
        KeyAction::Mouse(action)
    }
}

impl From<PlayMacroAction> for KeyAction {
    fn from(action: PlayMacroAction) -> Self {
        KeyAction::PlayMacro(action)
    }
}

impl From<SwitchKeymapAction> for KeyAction {
    fn from(action: SwitchKeymapAction) -> Self {
        KeyAction::SwitchKeymap(action)
    }
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAction::Keystroke(keystroke) => write!(f, "{}", keystroke),
            KeyAction::SwitchLayer(switch) => write!(f, "layer:{} ({})", switch.layer, switch.mode),
            KeyAction::Mouse(mouse) => write!(f, "mouse:{}", mouse.action),
            KeyAction::PlayMacro(play) => write!(f, "macro:{}", play.macro_id),
            KeyAction::SwitchKeymap(switch) => write!(f, "keymap:{}", switch.keymap_abbreviation),
            KeyAction::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystroke_completeness() {
        assert!(!KeystrokeAction::default().is_complete());
        assert!(KeystrokeAction::from_scancode(4u16).is_complete());

        let mods_only =
            KeystrokeAction::default().with_modifiers(ModifierMask::new(ModifierMask::LEFT_CTRL));
        assert!(mods_only.is_complete());
        assert!(!mods_only.has_scancode());
    }

    #[test]
    fn test_layer_switch_secondary_roles() {
        for role in [SecondaryRoleAction::Fn, SecondaryRoleAction::Mod, SecondaryRoleAction::Mouse] {
            let keystroke = KeystrokeAction::from_scancode(4u16).with_secondary_role(role);
            assert!(keystroke.has_layer_switch_secondary_role());
        }
        let ctrl = KeystrokeAction::from_scancode(4u16)
            .with_secondary_role(SecondaryRoleAction::LeftCtrl);
        assert!(!ctrl.has_layer_switch_secondary_role());
        assert!(!KeystrokeAction::from_scancode(4u16).has_layer_switch_secondary_role());
    }

    #[test]
    fn test_modifier_mask() {
        let mut mask = ModifierMask::default();
        assert!(mask.is_empty());
        mask.toggle(ModifierMask::LEFT_SHIFT);
        mask.toggle(ModifierMask::RIGHT_ALT);
        assert_eq!(mask.names().collect::<Vec<_>>(), vec!["LShift", "RAlt"]);
        mask.toggle(ModifierMask::LEFT_SHIFT);
        assert!(!mask.contains(ModifierMask::LEFT_SHIFT));
    }

    #[test]
    fn test_extra_mouse_buttons() {
        assert!(MouseActionParam::Button4.is_extra_button());
        assert!(MouseActionParam::Button8.is_extra_button());
        assert!(!MouseActionParam::LeftClick.is_extra_button());
        assert!(!MouseActionParam::ScrollUp.is_extra_button());
    }

    #[test]
    fn test_key_action_display() {
        let keystroke = KeystrokeAction::from_scancode(4u16)
            .with_modifiers(ModifierMask::new(ModifierMask::LEFT_CTRL))
            .with_secondary_role(SecondaryRoleAction::Fn);
        assert_eq!(KeyAction::from(keystroke).to_string(), "LCtrl+A / fn");
        assert_eq!(KeyAction::None.to_string(), "none");
        assert_eq!(
            KeyAction::from(SwitchLayerAction {
                layer: LayerName::Fn,
                mode: SwitchLayerMode::Toggle
            })
            .to_string(),
            "layer:fn (toggle)"
        );
    }

    #[test]
    fn test_layer_indices() {
        assert_eq!(LayerName::Mod.index(), 1);
        assert_eq!(LayerName::Fn.index(), 2);
        assert_eq!(LayerName::Mouse.index(), 3);
    }
}
