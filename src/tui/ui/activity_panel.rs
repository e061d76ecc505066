use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::app::App;
use crate::tui::theme::theme;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let t = theme();

    let block = Block::default()
        .title(t.panel_title("ACTIVITY", false))
        .borders(Borders::ALL)
        .border_style(t.panel_border(false))
        .border_type(BorderType::Plain);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.activity.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "No remaps yet. Select a key and press Enter.",
            t.text_muted(),
        ));
        frame.render_widget(empty, inner);
        return;
    }

    // Newest entries stay in view
    let visible_height = inner.height as usize;
    let start = app.activity.len().saturating_sub(visible_height);

    let lines: Vec<Line> = app.activity[start..]
        .iter()
        .map(|l| {
            if l.starts_with("Save error") {
                Line::styled(l.clone(), t.error_message())
            } else {
                Line::styled(l.clone(), t.text_primary())
            }
        })
        .collect();

    let activity = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(activity, inner);
}
