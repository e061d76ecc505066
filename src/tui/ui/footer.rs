use keyconf_core::TabKind;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::theme::{theme, Theme};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();

    let status_style = if app.status.starts_with("Error") {
        t.error_message()
    } else {
        t.status_message()
    };
    let line1 = Line::styled(format!("Status: {}", app.status), status_style);
    let line2 = if app.popover.is_visible() {
        popover_hints(app, t)
    } else {
        grid_hints(t)
    };

    let footer = Paragraph::new(vec![line1, line2]);
    frame.render_widget(footer, area);
}

fn hint<'a>(t: &Theme, key: &'a str, label: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(key, t.key_hint()),
        Span::styled(label, t.text_muted()),
    ]
}

fn grid_hints(t: &Theme) -> Line<'static> {
    let spans: Vec<Span<'static>> = [
        hint(t, "arrows", ":move  "),
        hint(t, "[ ]", ":layer  "),
        hint(t, "PgUp/PgDn", ":keymap  "),
        hint(t, "Enter", ":edit  "),
        hint(t, "s", ":save  "),
        hint(t, "q", ":quit"),
    ]
    .into_iter()
    .flatten()
    .collect();
    Line::from(spans)
}

fn popover_hints(app: &App, t: &Theme) -> Line<'static> {
    let tab_hint = match app.popover.active_tab() {
        TabKind::Keypress => hint(t, "type/F1-F8/arrows", ":key, mods, type, role  "),
        TabKind::Layer => hint(t, "arrows", ":layer and mode  "),
        TabKind::Mouse | TabKind::Macro | TabKind::Keymap => hint(t, "Up/Down", ":choose  "),
        TabKind::None => hint(t, "", ""),
    };
    let spans: Vec<Span<'static>> = [
        hint(t, "Tab", ":tabs  "),
        tab_hint,
        hint(t, "^A/^K", ":all layers/keymaps  "),
        hint(t, "^Enter", ":remap  "),
        hint(t, "Esc", ":cancel"),
    ]
    .into_iter()
    .flatten()
    .collect();
    Line::from(spans)
}
