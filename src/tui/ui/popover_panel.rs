use keyconf_core::{AnimationPhase, TabContext, TabEditors, TabKind};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::tui::app::App;
use crate::tui::theme::{theme, Theme};

pub fn render(frame: &mut Frame, app: &App) {
    let session = app.popover.session();
    // Keep drawing while the close animation runs
    if !session.is_visible && session.animation_phase != AnimationPhase::Closing {
        return;
    }

    let t = theme();
    let area = app.popover_area();
    if area.width < 4 || area.height < 4 {
        return;
    }

    let block = Block::default()
        .title(t.panel_title("REMAP KEY", session.animation_phase == AnimationPhase::Opened))
        .borders(Borders::ALL)
        .border_style(t.popover_border(session.animation_phase))
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);
    render_arrow(frame, app, area);

    let ctx = app.popover.tab_context();
    let mut lines = vec![tab_strip(app, t), Line::raw("")];
    lines.extend(tab_body(app.popover.active_tab(), app.popover.editors(), &ctx, t));

    // Scope and confirm rows sit at the bottom
    let body_height = inner.height.saturating_sub(3) as usize;
    lines.truncate(body_height);
    while lines.len() < body_height {
        lines.push(Line::raw(""));
    }
    lines.push(scope_line(app, t));
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled(" Remap ", t.remap_button(session.is_current_edit_valid)),
        Span::raw("  "),
        Span::styled(" Cancel ", t.text_secondary()),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Pointer from the popover to its key, pushed to an edge when the
/// popover had to be anchored there
fn render_arrow(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.popover.session();
    if area.y == 0 {
        return;
    }
    let x = if session.show_left_arrow {
        area.x + 2
    } else if session.show_right_arrow {
        area.right().saturating_sub(3)
    } else {
        area.x + area.width / 2
    };
    let arrow = Rect::new(x, area.y - 1, 1, 1).intersection(frame.area());
    let style = theme().popover_border(session.animation_phase);
    frame.render_widget(Paragraph::new(Span::styled("^", style)), arrow);
}

fn tab_strip(app: &App, t: &Theme) -> Line<'static> {
    let active = app.popover.active_tab();
    let mut spans = Vec::new();
    for header in app.popover.tabs() {
        spans.push(Span::styled(
            format!(" {} ", header.label),
            t.tab_header(header.kind == active, header.disabled),
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn field(t: &Theme, label: &str, value: String, valid: bool) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<11}", label), t.text_muted()),
        Span::styled(
            value,
            if valid {
                t.text_primary()
            } else {
                t.text_muted()
            },
        ),
    ])
}

fn tab_body(kind: TabKind, editors: &TabEditors, ctx: &TabContext, t: &Theme) -> Vec<Line<'static>> {
    match kind {
        TabKind::Keypress => {
            let value = editors.keypress.value;
            let modifiers: Vec<&str> = value.modifier_mask.names().collect();
            vec![
                field(
                    t,
                    "Key",
                    value
                        .scancode
                        .map(|s| s.name().to_string())
                        .unwrap_or_else(|| "type a key".to_string()),
                    value.has_scancode(),
                ),
                field(
                    t,
                    "Modifiers",
                    if modifiers.is_empty() {
                        "none".to_string()
                    } else {
                        modifiers.join(" ")
                    },
                    !modifiers.is_empty(),
                ),
                field(t, "Type", value.keystroke_type.to_string(), true),
                field(
                    t,
                    "Hold",
                    value
                        .secondary_role
                        .map(|role| role.to_string())
                        .unwrap_or_else(|| "none".to_string()),
                    value.secondary_role.is_some(),
                ),
            ]
        }
        TabKind::Layer => {
            let value = editors.layer.value;
            vec![
                field(t, "Layer", value.layer.to_string(), true),
                field(t, "Mode", value.mode.to_string(), true),
            ]
        }
        TabKind::Mouse => {
            let mut lines = vec![field(
                t,
                "Action",
                editors
                    .mouse
                    .selected
                    .map(|action| action.to_string())
                    .unwrap_or_else(|| "choose one".to_string()),
                editors.mouse.selected.is_some(),
            )];
            if !ctx.extra_mouse_buttons_supported {
                lines.push(Line::styled(
                    "Buttons 4-8 need a firmware update",
                    t.text_muted(),
                ));
            }
            lines
        }
        TabKind::Macro => {
            if !ctx.macro_playback_supported {
                return vec![Line::styled(
                    "Macro playback needs a firmware update",
                    t.status_message(),
                )];
            }
            let name = editors
                .macro_play
                .selected
                .and_then(|id| ctx.macros.get(&id).cloned());
            vec![field(
                t,
                "Macro",
                name.clone().unwrap_or_else(|| "choose one".to_string()),
                name.is_some(),
            )]
        }
        TabKind::Keymap => {
            let name = editors
                .keymap
                .selected
                .as_ref()
                .and_then(|abbr| ctx.keymap_options.get(abbr).map(|n| format!("{} ({})", n, abbr)));
            vec![field(
                t,
                "Switch to",
                name.clone().unwrap_or_else(|| "choose one".to_string()),
                name.is_some(),
            )]
        }
        TabKind::None => vec![Line::styled("The key will do nothing", t.text_secondary())],
    }
}

fn scope_line(app: &App, t: &Theme) -> Line<'static> {
    let scope = app.popover.remap_scope();
    let layers_locked = app.popover.session().disable_remap_on_all_layer;
    let checkbox = |checked: bool| if checked { "[x] " } else { "[ ] " };
    Line::from(vec![
        Span::styled(checkbox(scope.apply_to_all_layers), t.checkbox(scope.apply_to_all_layers)),
        Span::styled(
            "all layers",
            if layers_locked {
                t.tab_header(false, true)
            } else {
                t.text_secondary()
            },
        ),
        Span::raw("   "),
        Span::styled(checkbox(scope.apply_to_all_keymaps), t.checkbox(scope.apply_to_all_keymaps)),
        Span::styled("all keymaps", t.text_secondary()),
    ])
}
