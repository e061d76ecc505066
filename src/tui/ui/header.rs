use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, LAYER_NAMES};
use crate::tui::theme::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();

    let ready = app.device_ready();
    let device_label = if ready { "DEVICE READY" } else { "NO DEVICE" };
    let keymap = app
        .keymap()
        .map(|k| format!("{} ({})", k.name, k.abbreviation))
        .unwrap_or_else(|| "no keymap".to_string());

    let line = Line::from(vec![
        Span::styled("keyconf ", t.text_primary().add_modifier(Modifier::BOLD)),
        Span::styled(format!("[{}] ", device_label), t.device_badge(ready)),
        Span::styled(keymap, t.text_secondary()),
        Span::styled(format!(" / {} layer ", LAYER_NAMES[app.layer]), t.text_muted()),
        Span::styled("q:quit", t.key_hint()),
    ]);

    let header = Paragraph::new(line).alignment(Alignment::Left);

    frame.render_widget(header, area);
}
