use std::io;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use keyconf_core::{
    scancode_from_name, KeystrokeType, LayerName, ModifierMask, MouseActionParam,
    SecondaryRoleAction, SwitchLayerMode, TabEdit, TabKind,
};
use strum::IntoEnumIterator;

use crate::tui::app::App;

/// Modifier bits toggled by F1..F8, in mask order
const MODIFIER_KEYS: [u8; 8] = [
    ModifierMask::LEFT_CTRL,
    ModifierMask::LEFT_SHIFT,
    ModifierMask::LEFT_ALT,
    ModifierMask::LEFT_SUPER,
    ModifierMask::RIGHT_CTRL,
    ModifierMask::RIGHT_SHIFT,
    ModifierMask::RIGHT_ALT,
    ModifierMask::RIGHT_SUPER,
];

/// Handle input and return true if the app should quit
pub fn handle_input(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    if app.popover.is_visible() {
        handle_popover_input(app, key);
        app.forward_popover_events();
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(0, 1),
        KeyCode::Char('[') => app.previous_layer(),
        KeyCode::Char(']') => app.next_layer(),
        KeyCode::PageUp => app.cycle_keymap(false),
        KeyCode::PageDown => app.cycle_keymap(true),
        KeyCode::Enter | KeyCode::Char(' ') => app.open_popover(),
        KeyCode::Char('s') => app.save_configuration(),
        _ => {}
    }

    Ok(false)
}

fn handle_popover_input(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => app.popover.escape(),
        KeyCode::Enter if ctrl => app.popover.confirm_shortcut(),
        // Many terminals never report Ctrl+Enter
        KeyCode::Char('s') if ctrl => app.popover.confirm_shortcut(),
        KeyCode::Enter => {
            if !app.popover.confirm() {
                app.set_status("Nothing to remap yet");
            }
        }
        KeyCode::Tab => {
            app.popover.select_next_tab();
        }
        KeyCode::BackTab => {
            app.popover.select_previous_tab();
        }
        KeyCode::Char('a') if ctrl => {
            let value = !app.popover.remap_scope().apply_to_all_layers;
            if !app.popover.set_apply_to_all_layers(value) {
                app.set_status("Layer switching keys can only be remapped on one layer");
            }
        }
        KeyCode::Char('k') if ctrl => {
            let value = !app.popover.remap_scope().apply_to_all_keymaps;
            app.popover.set_apply_to_all_keymaps(value);
        }
        _ => handle_tab_input(app, key),
    }
}

fn handle_tab_input(app: &mut App, key: KeyEvent) {
    let edit = match app.popover.active_tab() {
        TabKind::Keypress => keypress_edit(app, key),
        TabKind::Layer => layer_edit(app, key),
        TabKind::Mouse => mouse_edit(app, key),
        TabKind::Macro => macro_edit(app, key),
        TabKind::Keymap => keymap_edit(app, key),
        TabKind::None => None,
    };
    if let Some(edit) = edit {
        app.popover.edit(edit);
    }
}

fn keypress_edit(app: &App, key: KeyEvent) -> Option<TabEdit> {
    let value = app.popover.editors().keypress.value;
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let name = if c == ' ' { "SPACE".to_string() } else { c.to_string() };
            scancode_from_name(&name).map(|code| TabEdit::SetScancode(Some(code)))
        }
        KeyCode::Backspace | KeyCode::Delete => Some(TabEdit::SetScancode(None)),
        KeyCode::F(n @ 1..=8) => Some(TabEdit::ToggleModifier(MODIFIER_KEYS[usize::from(n - 1)])),
        KeyCode::Left | KeyCode::Right => {
            let types: Vec<KeystrokeType> = KeystrokeType::iter().collect();
            cycle(&types, Some(&value.keystroke_type), key.code == KeyCode::Right)
                .map(TabEdit::SetKeystrokeType)
        }
        KeyCode::Up | KeyCode::Down => {
            // None comes first, then every role
            let roles: Vec<Option<SecondaryRoleAction>> = std::iter::once(None)
                .chain(SecondaryRoleAction::iter().map(Some))
                .collect();
            cycle(&roles, Some(&value.secondary_role), key.code == KeyCode::Down)
                .map(TabEdit::SetSecondaryRole)
        }
        _ => None,
    }
}

fn layer_edit(app: &App, key: KeyEvent) -> Option<TabEdit> {
    let value = app.popover.editors().layer.value;
    match key.code {
        KeyCode::Left | KeyCode::Right => {
            let layers: Vec<LayerName> = LayerName::iter().collect();
            cycle(&layers, Some(&value.layer), key.code == KeyCode::Right).map(TabEdit::SetLayer)
        }
        KeyCode::Up | KeyCode::Down => {
            let allow_double_tap = app.popover.inputs().allow_layer_double_tap;
            let modes: Vec<SwitchLayerMode> = SwitchLayerMode::iter()
                .filter(|mode| allow_double_tap || *mode != SwitchLayerMode::HoldAndDoubleTapToggle)
                .collect();
            cycle(&modes, Some(&value.mode), key.code == KeyCode::Down).map(TabEdit::SetLayerMode)
        }
        _ => None,
    }
}

fn mouse_edit(app: &App, key: KeyEvent) -> Option<TabEdit> {
    let extra_buttons = app.popover.tab_context().extra_mouse_buttons_supported;
    let actions: Vec<MouseActionParam> = MouseActionParam::iter()
        .filter(|action| extra_buttons || !action.is_extra_button())
        .collect();
    let current = app.popover.editors().mouse.selected;
    match key.code {
        KeyCode::Up | KeyCode::Down => {
            cycle(&actions, current.as_ref(), key.code == KeyCode::Down).map(TabEdit::SetMouseAction)
        }
        _ => None,
    }
}

fn macro_edit(app: &App, key: KeyEvent) -> Option<TabEdit> {
    let ids: Vec<u8> = app.popover.tab_context().macros.keys().copied().collect();
    let current = app.popover.editors().macro_play.selected;
    match key.code {
        KeyCode::Up | KeyCode::Down => {
            cycle(&ids, current.as_ref(), key.code == KeyCode::Down).map(TabEdit::SetMacro)
        }
        _ => None,
    }
}

fn keymap_edit(app: &App, key: KeyEvent) -> Option<TabEdit> {
    let abbreviations: Vec<String> = app.popover.tab_context().keymap_options.into_keys().collect();
    let current = app.popover.editors().keymap.selected.clone();
    match key.code {
        KeyCode::Up | KeyCode::Down => cycle(&abbreviations, current.as_ref(), key.code == KeyCode::Down)
            .map(TabEdit::SetKeymap),
        _ => None,
    }
}

/// Step through `items` from `current`, wrapping at both ends.
/// Without a current item the first (or last) one is picked.
fn cycle<T: PartialEq + Clone>(items: &[T], current: Option<&T>, forward: bool) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let len = items.len();
    let index = match current.and_then(|c| items.iter().position(|item| item == c)) {
        Some(index) if forward => (index + 1) % len,
        Some(index) => (index + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    items.get(index).cloned()
}
