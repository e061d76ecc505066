// Keyconf Popover Tabs
// Tab table, availability rules and the per-tab working values

use indexmap::IndexMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::action::{
    KeyAction, KeystrokeAction, KeystrokeType, LayerName, MouseAction, MouseActionParam,
    PlayMacroAction, SecondaryRoleAction, SwitchKeymapAction, SwitchLayerAction, SwitchLayerMode,
};
use crate::keymap::BASE_LAYER;
use crate::remap::RemapScope;
use crate::store::{self, AppState};
use crate::Scancode;

/// The six editor tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TabKind {
    Keypress,
    Layer,
    Mouse,
    Macro,
    Keymap,
    None,
}

impl TabKind {
    /// Default tab for an existing key action
    pub fn for_key_action(action: &KeyAction) -> TabKind {
        match action {
            KeyAction::Keystroke(_) => TabKind::Keypress,
            KeyAction::SwitchLayer(_) => TabKind::Layer,
            KeyAction::Mouse(_) => TabKind::Mouse,
            KeyAction::PlayMacro(_) => TabKind::Macro,
            KeyAction::SwitchKeymap(_) => TabKind::Keymap,
            KeyAction::None => TabKind::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TabKind::Keypress => "Keypress",
            TabKind::Layer => "Layer",
            TabKind::Mouse => "Mouse",
            TabKind::Macro => "Macro",
            TabKind::Keymap => "Keymap",
            TabKind::None => "None",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            TabKind::Keypress => "square-a",
            TabKind::Layer => "clone",
            TabKind::Mouse => "mouse-pointer",
            TabKind::Macro => "play",
            TabKind::Keymap => "keyboard",
            TabKind::None => "ban",
        }
    }

    /// Position in the tab strip
    pub fn position(self) -> usize {
        TabKind::iter().position(|k| k == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabHeader {
    pub kind: TabKind,
    pub label: &'static str,
    pub icon: &'static str,
    pub disabled: bool,
}

pub const TAB_COUNT: usize = 6;

/// Tab strip for a candidate tab on a given layer.
///
/// Editing a layer switch from any layer but the base one locks the
/// popover to the Layer tab; every other combination enables all tabs.
pub fn compute_tab_availability(candidate: TabKind, current_layer: usize) -> [TabHeader; TAB_COUNT] {
    let only_layer_tab = candidate == TabKind::Layer && current_layer != BASE_LAYER;
    let mut headers = [TabHeader {
        kind: TabKind::None,
        label: "",
        icon: "",
        disabled: false,
    }; TAB_COUNT];
    for (slot, kind) in headers.iter_mut().zip(TabKind::iter()) {
        *slot = TabHeader {
            kind,
            label: kind.label(),
            icon: kind.icon(),
            disabled: only_layer_tab && kind != TabKind::Layer,
        };
    }
    headers
}

/// Read views the tabs validate against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabContext {
    /// Keymap abbreviation -> display name, in definition order
    pub keymap_options: IndexMap<String, String>,
    /// Macro id -> name
    pub macros: IndexMap<u8, String>,
    pub macro_playback_supported: bool,
    pub extra_mouse_buttons_supported: bool,
    pub allow_layer_double_tap: bool,
}

impl TabContext {
    pub fn from_state(state: &AppState, allow_layer_double_tap: bool) -> Self {
        Self {
            keymap_options: store::get_keymap_options(state)
                .into_iter()
                .map(|option| (option.value, option.label))
                .collect(),
            macros: store::get_macros(state)
                .iter()
                .map(|m| (m.id, m.name.clone()))
                .collect(),
            macro_playback_supported: store::macro_playback_supported(state),
            extra_mouse_buttons_supported: store::extra_mouse_buttons_supported(state),
            allow_layer_double_tap,
        }
    }
}

/// Why a tab could not produce a key action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Keystroke needs a key or a modifier")]
    IncompleteKeystroke,

    #[error("Layer switch secondary roles are unavailable when remapping on all layers")]
    SecondaryRoleNotAllowed,

    #[error("No mouse action selected")]
    NoMouseAction,

    #[error("Mouse {0} is not supported by the connected firmware")]
    ExtraButtonUnsupported(MouseActionParam),

    #[error("Macro playback is not supported by the connected firmware")]
    MacroPlaybackUnsupported,

    #[error("No macro selected")]
    NoMacroSelected,

    #[error("Unknown macro: {0}")]
    UnknownMacro(u8),

    #[error("No keymap selected")]
    NoKeymapSelected,

    #[error("Unknown keymap: {0}")]
    UnknownKeymap(String),
}

/// A single edit made inside the active tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEdit {
    SetKeystrokeType(KeystrokeType),
    SetScancode(Option<Scancode>),
    ToggleModifier(u8),
    SetSecondaryRole(Option<SecondaryRoleAction>),
    SetLayer(LayerName),
    SetLayerMode(SwitchLayerMode),
    SetMouseAction(MouseActionParam),
    SetMacro(u8),
    SetKeymap(String),
}

impl TabEdit {
    /// Tab an edit belongs to
    pub fn tab(&self) -> TabKind {
        match self {
            TabEdit::SetKeystrokeType(_)
            | TabEdit::SetScancode(_)
            | TabEdit::ToggleModifier(_)
            | TabEdit::SetSecondaryRole(_) => TabKind::Keypress,
            TabEdit::SetLayer(_) | TabEdit::SetLayerMode(_) => TabKind::Layer,
            TabEdit::SetMouseAction(_) => TabKind::Mouse,
            TabEdit::SetMacro(_) => TabKind::Macro,
            TabEdit::SetKeymap(_) => TabKind::Keymap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypressTab {
    pub value: KeystrokeAction,
    /// Cleared while the edit is applied to all layers
    pub layer_roles_allowed: bool,
}

impl Default for KeypressTab {
    fn default() -> Self {
        Self {
            value: KeystrokeAction::default(),
            layer_roles_allowed: true,
        }
    }
}

impl KeypressTab {
    fn seed(action: &KeyAction, scope: &RemapScope) -> Self {
        Self {
            value: action.as_keystroke().copied().unwrap_or_default(),
            layer_roles_allowed: !scope.apply_to_all_layers,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.to_key_action().is_ok()
    }

    pub fn to_key_action(&self) -> Result<KeyAction, ConversionError> {
        if !self.value.is_complete() {
            return Err(ConversionError::IncompleteKeystroke);
        }
        if !self.layer_roles_allowed && self.value.has_layer_switch_secondary_role() {
            return Err(ConversionError::SecondaryRoleNotAllowed);
        }
        Ok(KeyAction::Keystroke(self.value))
    }

    fn remap_info_changed(&mut self, scope: &RemapScope) {
        self.layer_roles_allowed = !scope.apply_to_all_layers;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayerTab {
    pub value: SwitchLayerAction,
}

impl LayerTab {
    fn seed(action: &KeyAction) -> Self {
        match action {
            KeyAction::SwitchLayer(switch) => Self { value: *switch },
            _ => Self::default(),
        }
    }

    pub fn to_key_action(&self, ctx: &TabContext) -> KeyAction {
        let mut value = self.value;
        if value.mode == SwitchLayerMode::HoldAndDoubleTapToggle && !ctx.allow_layer_double_tap {
            value.mode = SwitchLayerMode::Toggle;
        }
        KeyAction::SwitchLayer(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MouseTab {
    pub selected: Option<MouseActionParam>,
}

impl MouseTab {
    fn seed(action: &KeyAction) -> Self {
        match action {
            KeyAction::Mouse(mouse) => Self {
                selected: Some(mouse.action),
            },
            _ => Self::default(),
        }
    }

    pub fn to_key_action(&self, ctx: &TabContext) -> Result<KeyAction, ConversionError> {
        let action = self.selected.ok_or(ConversionError::NoMouseAction)?;
        if action.is_extra_button() && !ctx.extra_mouse_buttons_supported {
            return Err(ConversionError::ExtraButtonUnsupported(action));
        }
        Ok(KeyAction::Mouse(MouseAction { action }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacroTab {
    pub selected: Option<u8>,
}

impl MacroTab {
    fn seed(action: &KeyAction) -> Self {
        match action {
            KeyAction::PlayMacro(play) => Self {
                selected: Some(play.macro_id),
            },
            _ => Self::default(),
        }
    }

    pub fn to_key_action(&self, ctx: &TabContext) -> Result<KeyAction, ConversionError> {
        if !ctx.macro_playback_supported {
            return Err(ConversionError::MacroPlaybackUnsupported);
        }
        let macro_id = self.selected.ok_or(ConversionError::NoMacroSelected)?;
        if !ctx.macros.contains_key(&macro_id) {
            return Err(ConversionError::UnknownMacro(macro_id));
        }
        Ok(KeyAction::PlayMacro(PlayMacroAction { macro_id }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeymapTab {
    pub selected: Option<String>,
}

impl KeymapTab {
    fn seed(action: &KeyAction) -> Self {
        match action {
            KeyAction::SwitchKeymap(switch) => Self {
                selected: Some(switch.keymap_abbreviation.clone()),
            },
            _ => Self::default(),
        }
    }

    pub fn to_key_action(&self, ctx: &TabContext) -> Result<KeyAction, ConversionError> {
        let abbreviation = self
            .selected
            .as_ref()
            .ok_or(ConversionError::NoKeymapSelected)?;
        if !ctx.keymap_options.contains_key(abbreviation) {
            return Err(ConversionError::UnknownKeymap(abbreviation.clone()));
        }
        Ok(KeyAction::SwitchKeymap(SwitchKeymapAction {
            keymap_abbreviation: abbreviation.clone(),
        }))
    }
}

/// Working values of all tabs. Tabs never read each other's state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabEditors {
    pub keypress: KeypressTab,
    pub layer: LayerTab,
    pub mouse: MouseTab,
    pub macro_play: MacroTab,
    pub keymap: KeymapTab,
}

impl TabEditors {
    /// Reset one tab's working value from the incoming key action
    pub fn seed(&mut self, kind: TabKind, action: &KeyAction, scope: &RemapScope) {
        match kind {
            TabKind::Keypress => self.keypress = KeypressTab::seed(action, scope),
            TabKind::Layer => self.layer = LayerTab::seed(action),
            TabKind::Mouse => self.mouse = MouseTab::seed(action),
            TabKind::Macro => self.macro_play = MacroTab::seed(action),
            TabKind::Keymap => self.keymap = KeymapTab::seed(action),
            TabKind::None => {}
        }
    }

    pub fn seed_all(&mut self, action: &KeyAction, scope: &RemapScope) {
        for kind in TabKind::iter() {
            self.seed(kind, action, scope);
        }
    }

    /// Convert a tab's working value into a finished key action
    pub fn to_key_action(&self, kind: TabKind, ctx: &TabContext) -> Result<KeyAction, ConversionError> {
        match kind {
            TabKind::Keypress => self.keypress.to_key_action(),
            TabKind::Layer => Ok(self.layer.to_key_action(ctx)),
            TabKind::Mouse => self.mouse.to_key_action(ctx),
            TabKind::Macro => self.macro_play.to_key_action(ctx),
            TabKind::Keymap => self.keymap.to_key_action(ctx),
            TabKind::None => Ok(KeyAction::None),
        }
    }

    pub fn is_valid(&self, kind: TabKind, ctx: &TabContext) -> bool {
        self.to_key_action(kind, ctx).is_ok()
    }

    /// The in-progress value of a tab, complete or not
    pub fn working_action(&self, kind: TabKind) -> Option<KeyAction> {
        match kind {
            TabKind::Keypress => Some(KeyAction::Keystroke(self.keypress.value)),
            TabKind::Layer => Some(KeyAction::SwitchLayer(self.layer.value)),
            TabKind::Mouse => self
                .mouse
                .selected
                .map(|action| KeyAction::Mouse(MouseAction { action })),
            TabKind::Macro => self
                .macro_play
                .selected
                .map(|macro_id| KeyAction::PlayMacro(PlayMacroAction { macro_id })),
            TabKind::Keymap => self.keymap.selected.clone().map(|keymap_abbreviation| {
                KeyAction::SwitchKeymap(SwitchKeymapAction {
                    keymap_abbreviation,
                })
            }),
            TabKind::None => Some(KeyAction::None),
        }
    }

    /// Apply an edit to its tab; returns false if the value was rejected
    pub fn apply(&mut self, edit: TabEdit) -> bool {
        match edit {
            TabEdit::SetKeystrokeType(keystroke_type) => self.keypress.value.keystroke_type = keystroke_type,
            TabEdit::SetScancode(scancode) => self.keypress.value.scancode = scancode,
            TabEdit::ToggleModifier(bit) => self.keypress.value.modifier_mask.toggle(bit),
            TabEdit::SetSecondaryRole(role) => {
                if role.is_some_and(SecondaryRoleAction::is_layer_switch)
                    && !self.keypress.layer_roles_allowed
                {
                    return false;
                }
                self.keypress.value.secondary_role = role;
            }
            TabEdit::SetLayer(layer) => self.layer.value.layer = layer,
            TabEdit::SetLayerMode(mode) => self.layer.value.mode = mode,
            TabEdit::SetMouseAction(action) => self.mouse.selected = Some(action),
            TabEdit::SetMacro(macro_id) => self.macro_play.selected = Some(macro_id),
            TabEdit::SetKeymap(abbreviation) => self.keymap.selected = Some(abbreviation),
        }
        true
    }

    /// Forward a scope change to the tabs that depend on it
    pub fn remap_info_changed(&mut self, scope: &RemapScope) {
        self.keypress.remap_info_changed(scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TabContext {
        let mut ctx = TabContext {
            macro_playback_supported: true,
            ..TabContext::default()
        };
        ctx.keymap_options.insert("QWR".to_string(), "QWERTY".to_string());
        ctx.macros.insert(1, "Hello".to_string());
        ctx
    }

    #[test]
    fn test_tab_for_every_key_action() {
        let cases = [
            (KeyAction::Keystroke(KeystrokeAction::default()), TabKind::Keypress),
            (KeyAction::SwitchLayer(SwitchLayerAction::default()), TabKind::Layer),
            (
                KeyAction::Mouse(MouseAction {
                    action: MouseActionParam::LeftClick,
                }),
                TabKind::Mouse,
            ),
            (KeyAction::PlayMacro(PlayMacroAction { macro_id: 0 }), TabKind::Macro),
            (
                KeyAction::SwitchKeymap(SwitchKeymapAction {
                    keymap_abbreviation: "QWR".to_string(),
                }),
                TabKind::Keymap,
            ),
            (KeyAction::None, TabKind::None),
        ];
        for (action, expected) in cases {
            assert_eq!(TabKind::for_key_action(&action), expected);
        }
    }

    #[test]
    fn test_tab_order_and_labels() {
        let headers = compute_tab_availability(TabKind::None, 0);
        let labels: Vec<_> = headers.iter().map(|h| h.label).collect();
        assert_eq!(labels, vec!["Keypress", "Layer", "Mouse", "Macro", "Keymap", "None"]);
        assert_eq!(TabKind::Keymap.position(), 4);
        assert_eq!(headers[5].icon, "ban");
    }

    #[test]
    fn test_layer_lockout_on_non_base_layer() {
        for layer in 1..4 {
            let headers = compute_tab_availability(TabKind::Layer, layer);
            for header in headers {
                assert_eq!(header.disabled, header.kind != TabKind::Layer);
            }
        }
    }

    #[test]
    fn test_all_tabs_enabled_otherwise() {
        for kind in TabKind::iter() {
            assert!(compute_tab_availability(kind, 0).iter().all(|h| !h.disabled));
        }
        for kind in TabKind::iter().filter(|k| *k != TabKind::Layer) {
            assert!(compute_tab_availability(kind, 2).iter().all(|h| !h.disabled));
        }
    }

    #[test]
    fn test_keypress_conversion() {
        let mut editors = TabEditors::default();
        editors.seed_all(&KeyAction::None, &RemapScope::default());
        assert_eq!(
            editors.to_key_action(TabKind::Keypress, &context()),
            Err(ConversionError::IncompleteKeystroke)
        );

        assert!(editors.apply(TabEdit::SetScancode(Some(Scancode(4)))));
        assert_eq!(
            editors.to_key_action(TabKind::Keypress, &context()),
            Ok(KeyAction::Keystroke(KeystrokeAction::from_scancode(4u16)))
        );
    }

    #[test]
    fn test_layer_roles_rejected_when_remapping_all_layers() {
        let mut editors = TabEditors::default();
        editors.seed_all(&KeyAction::None, &RemapScope::new(false, true));
        assert!(!editors.apply(TabEdit::SetSecondaryRole(Some(SecondaryRoleAction::Fn))));
        assert!(editors.apply(TabEdit::SetSecondaryRole(Some(SecondaryRoleAction::LeftAlt))));

        editors.remap_info_changed(&RemapScope::default());
        assert!(editors.apply(TabEdit::SetSecondaryRole(Some(SecondaryRoleAction::Fn))));
    }

    #[test]
    fn test_layer_double_tap_downgrade() {
        let mut editors = TabEditors::default();
        editors.apply(TabEdit::SetLayer(LayerName::Fn));
        editors.apply(TabEdit::SetLayerMode(SwitchLayerMode::HoldAndDoubleTapToggle));

        let mut ctx = context();
        assert_eq!(
            editors.to_key_action(TabKind::Layer, &ctx),
            Ok(KeyAction::SwitchLayer(SwitchLayerAction {
                layer: LayerName::Fn,
                mode: SwitchLayerMode::Toggle,
            }))
        );
        ctx.allow_layer_double_tap = true;
        assert_eq!(
            editors.to_key_action(TabKind::Layer, &ctx),
            Ok(KeyAction::SwitchLayer(SwitchLayerAction {
                layer: LayerName::Fn,
                mode: SwitchLayerMode::HoldAndDoubleTapToggle,
            }))
        );
    }

    #[test]
    fn test_mouse_extra_buttons_need_support() {
        let mut editors = TabEditors::default();
        let mut ctx = context();
        assert_eq!(
            editors.to_key_action(TabKind::Mouse, &ctx),
            Err(ConversionError::NoMouseAction)
        );
        editors.apply(TabEdit::SetMouseAction(MouseActionParam::Button5));
        assert!(!editors.is_valid(TabKind::Mouse, &ctx));
        ctx.extra_mouse_buttons_supported = true;
        assert!(editors.is_valid(TabKind::Mouse, &ctx));
    }

    #[test]
    fn test_macro_and_keymap_validation() {
        let mut editors = TabEditors::default();
        let mut ctx = context();

        editors.apply(TabEdit::SetMacro(7));
        assert_eq!(
            editors.to_key_action(TabKind::Macro, &ctx),
            Err(ConversionError::UnknownMacro(7))
        );
        editors.apply(TabEdit::SetMacro(1));
        assert!(editors.is_valid(TabKind::Macro, &ctx));
        ctx.macro_playback_supported = false;
        assert_eq!(
            editors.to_key_action(TabKind::Macro, &ctx),
            Err(ConversionError::MacroPlaybackUnsupported)
        );

        editors.apply(TabEdit::SetKeymap("XYZ".to_string()));
        assert!(!editors.is_valid(TabKind::Keymap, &ctx));
        editors.apply(TabEdit::SetKeymap("QWR".to_string()));
        assert!(editors.is_valid(TabKind::Keymap, &ctx));
    }

    #[test]
    fn test_none_tab_always_valid() {
        let editors = TabEditors::default();
        assert_eq!(editors.to_key_action(TabKind::None, &TabContext::default()), Ok(KeyAction::None));
    }

    #[test]
    fn test_seed_only_matching_variant() {
        let mut editors = TabEditors::default();
        let action = KeyAction::Mouse(MouseAction {
            action: MouseActionParam::ScrollDown,
        });
        editors.seed_all(&action, &RemapScope::default());
        assert_eq!(editors.mouse.selected, Some(MouseActionParam::ScrollDown));
        assert_eq!(editors.keypress.value, KeystrokeAction::default());
        assert_eq!(editors.macro_play.selected, None);
        assert_eq!(editors.working_action(TabKind::Mouse), Some(action));
    }
}
