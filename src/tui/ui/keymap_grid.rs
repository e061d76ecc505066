use keyconf_core::KeyAction;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::app::{App, KEY_HEIGHT, KEY_WIDTH, LAYER_NAMES};
use crate::tui::theme::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();
    let focused = !app.popover.is_visible();

    let title = match app.keymap() {
        Some(keymap) => format!("{} - {} LAYER", keymap.name, LAYER_NAMES[app.layer].to_uppercase()),
        None => "NO KEYMAP".to_string(),
    };
    let block = Block::default()
        .title(t.panel_title(&title, focused))
        .borders(Borders::ALL)
        .border_style(t.panel_border(focused))
        .border_type(if focused {
            BorderType::Thick
        } else {
            BorderType::Plain
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(keymap) = app.keymap() else {
        return;
    };
    let Some(layer) = keymap.layer(app.layer) else {
        return;
    };

    for (slot, action) in layer.key_actions.iter().enumerate() {
        let key_area = app.key_area(slot).intersection(inner);
        // Keys that do not fit are not drawn
        if key_area.width < KEY_WIDTH || key_area.height < KEY_HEIGHT {
            continue;
        }
        let selected = slot == app.slot;
        let style = t.key_cap(action, selected);
        let cap = Block::default()
            .borders(Borders::ALL)
            .border_style(if selected {
                t.panel_border(true)
            } else {
                t.panel_border(false)
            });
        let label = Paragraph::new(Line::styled(key_label(action), style))
            .alignment(Alignment::Center)
            .block(cap);
        frame.render_widget(label, key_area);
    }
}

/// Short text shown on a key cap
pub fn key_label(action: &KeyAction) -> String {
    let label = match action {
        KeyAction::Keystroke(keystroke) => match keystroke.scancode {
            Some(scancode) => scancode.name().to_string(),
            None => keystroke.modifier_mask.names().collect::<Vec<_>>().join("+"),
        },
        KeyAction::SwitchLayer(switch) => switch.layer.to_string(),
        KeyAction::Mouse(mouse) => mouse.action.to_string(),
        KeyAction::PlayMacro(play) => format!("M{}", play.macro_id),
        KeyAction::SwitchKeymap(switch) => switch.keymap_abbreviation.clone(),
        KeyAction::None => String::new(),
    };
    label
        .chars()
        .take(usize::from(KEY_WIDTH - 2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyconf_core::{KeystrokeAction, ModifierMask, PlayMacroAction};

    #[test]
    fn test_key_labels_fit_the_cap() {
        let keystroke = KeyAction::Keystroke(KeystrokeAction::from_scancode(4u16));
        assert_eq!(key_label(&keystroke), "A");

        let modifiers = KeyAction::Keystroke(KeystrokeAction::default().with_modifiers(
            ModifierMask::new(ModifierMask::LEFT_CTRL | ModifierMask::LEFT_SHIFT),
        ));
        assert_eq!(key_label(&modifiers).chars().count(), usize::from(KEY_WIDTH - 2));

        assert_eq!(key_label(&KeyAction::PlayMacro(PlayMacroAction { macro_id: 3 })), "M3");
        assert_eq!(key_label(&KeyAction::None), "");
    }
}
