use keyconf_core::store;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::app::{App, LAYER_NAMES};
use crate::tui::theme::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();

    let block = Block::default()
        .title(t.panel_title("KEYMAPS", false))
        .borders(Borders::ALL)
        .border_style(t.panel_border(false))
        .border_type(BorderType::Plain);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    for (index, (abbreviation, name)) in app.keymap_names().into_iter().enumerate() {
        let selected = index == app.keymap_index;
        let prefix = if selected { ">" } else { " " };
        let style = if selected {
            t.title_focused()
        } else {
            t.text_secondary()
        };
        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(format!("{:<4}", abbreviation), t.text_muted()),
            Span::styled(name, style),
        ]));
    }

    lines.push(Line::raw(""));
    let mut layer_spans = vec![Span::styled("Layer ", t.text_muted())];
    for (index, name) in LAYER_NAMES.iter().enumerate() {
        let style = if index == app.layer {
            t.selection()
        } else {
            t.text_secondary()
        };
        layer_spans.push(Span::styled(*name, style));
        layer_spans.push(Span::raw(" "));
    }
    lines.push(Line::from(layer_spans));

    lines.push(Line::raw(""));
    let (firmware, macros, extra_buttons) = app.store.select(|state| {
        (
            state.device.firmware_version,
            store::macro_playback_supported(state),
            store::extra_mouse_buttons_supported(state),
        )
    });
    lines.push(Line::from(vec![
        Span::styled("Firmware ", t.text_muted()),
        Span::styled(
            firmware
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            t.text_secondary(),
        ),
    ]));
    for (label, supported) in [("Macro playback", macros), ("Mouse buttons 4-8", extra_buttons)] {
        lines.push(Line::from(vec![
            Span::styled(if supported { "[x] " } else { "[ ] " }, t.checkbox(supported)),
            Span::styled(label, t.text_secondary()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
