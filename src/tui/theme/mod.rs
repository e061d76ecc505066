mod palette;

use keyconf_core::{AnimationPhase, KeyAction};
use ratatui::prelude::*;

pub use palette::Palette;

pub struct Theme {
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    pub fn new() -> Self {
        Self {
            palette: Palette::new(),
        }
    }

    // Panel border style
    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.palette.border_focused)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.border_default)
        }
    }

    // Device badge in the header
    pub fn device_badge(&self, ready: bool) -> Style {
        let bg = if ready {
            self.palette.bg_device_ready
        } else {
            self.palette.bg_device_missing
        };
        Style::default()
            .fg(Color::Black)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }

    // Checkbox style
    pub fn checkbox(&self, checked: bool) -> Style {
        if checked {
            Style::default().fg(self.palette.accent_success)
        } else {
            Style::default().fg(self.palette.text_muted)
        }
    }

    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.palette.text_primary)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.palette.text_secondary)
    }

    // Muted text (hints, labels)
    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.palette.text_muted)
    }

    pub fn title_focused(&self) -> Style {
        Style::default()
            .fg(self.palette.accent_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_unfocused(&self) -> Style {
        Style::default().fg(self.palette.text_muted)
    }

    // Key hint style (the key part like "Tab")
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.palette.accent_primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_message(&self) -> Style {
        Style::default().fg(self.palette.accent_warning)
    }

    pub fn error_message(&self) -> Style {
        Style::default()
            .fg(self.palette.accent_danger)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selection(&self) -> Style {
        Style::default()
            .fg(self.palette.selection_fg)
            .bg(self.palette.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    // Key cap colored by the kind of action it holds
    pub fn key_cap(&self, action: &KeyAction, selected: bool) -> Style {
        if selected {
            return self.selection();
        }
        let fg = match action {
            KeyAction::Keystroke(_) => self.palette.key_keystroke,
            KeyAction::SwitchLayer(_) => self.palette.key_layer,
            KeyAction::Mouse(_) => self.palette.key_mouse,
            KeyAction::PlayMacro(_) => self.palette.key_macro,
            KeyAction::SwitchKeymap(_) => self.palette.key_keymap,
            KeyAction::None => self.palette.text_muted,
        };
        Style::default().fg(fg)
    }

    // Tab header in the popover strip
    pub fn tab_header(&self, active: bool, disabled: bool) -> Style {
        if disabled {
            Style::default()
                .fg(self.palette.border_default)
                .add_modifier(Modifier::CROSSED_OUT)
        } else if active {
            self.selection()
        } else {
            self.text_secondary()
        }
    }

    // Popover frame while it animates in or out
    pub fn popover_border(&self, phase: AnimationPhase) -> Style {
        match phase {
            AnimationPhase::Opened => self.panel_border(true),
            _ => Style::default().fg(self.palette.text_muted),
        }
    }

    // Remap button, lit only when the edit can be confirmed
    pub fn remap_button(&self, valid: bool) -> Style {
        if valid {
            Style::default()
                .fg(self.palette.selection_fg)
                .bg(self.palette.accent_success)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.text_muted)
        }
    }

    // Panel title with optional focus indicator
    pub fn panel_title(&self, title: &str, focused: bool) -> Line<'_> {
        if focused {
            Line::styled(format!(" {} ", title), self.title_focused())
        } else {
            Line::styled(format!(" {} ", title), self.title_unfocused())
        }
    }
}

/// Global theme instance
pub static THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::new)
}
