use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use keyconf_core::store::{self, get_keymaps, get_user_configuration};
use keyconf_core::{
    Intent, KeyAction, Keymap, LayoutProvider, Popover, PopoverChanges, PopoverEvent, Rect,
    RemapScope, RemapTarget, Settings, Store, LAYER_COUNT,
};
use ratatui::layout::{Constraint, Direction, Layout};

const MAX_ACTIVITY_LINES: usize = 200;

/// Keys per row of the grid
pub const KEY_COLUMNS: usize = 12;
pub const KEY_WIDTH: u16 = 7;
pub const KEY_HEIGHT: u16 = 3;
pub const POPOVER_HEIGHT: u16 = 13;

pub const LAYER_NAMES: [&str; LAYER_COUNT] = ["Base", "Mod", "Fn", "Mouse"];

/// Pixel size of one terminal cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width_px: f64,
    pub height_px: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width_px: 8.0,
            height_px: 16.0,
        }
    }
}

impl CellMetrics {
    pub fn to_px(&self, area: ratatui::layout::Rect) -> Rect {
        Rect::new(
            f64::from(area.x) * self.width_px,
            f64::from(area.y) * self.height_px,
            f64::from(area.width) * self.width_px,
            f64::from(area.height) * self.height_px,
        )
    }

    pub fn column(&self, px: f64) -> u16 {
        (px / self.width_px).round().max(0.0) as u16
    }

    pub fn row(&self, px: f64) -> u16 {
        (px / self.height_px).round().max(0.0) as u16
    }

    /// Cells needed to cover a pixel width
    pub fn columns_for(&self, px: f64) -> u16 {
        (px / self.width_px).ceil().max(1.0) as u16
    }
}

/// Popover measurements derived from the terminal grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalLayout {
    pub metrics: CellMetrics,
    pub popover_width_px: f64,
}

impl LayoutProvider for TerminalLayout {
    fn popover_width(&self) -> f64 {
        self.popover_width_px
    }

    // The grid never scrolls
    fn scroll_y(&self) -> f64 {
        0.0
    }
}

/// Screen regions of the main view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyLayout {
    pub header: ratatui::layout::Rect,
    pub body: ratatui::layout::Rect,
    pub side: ratatui::layout::Rect,
    pub grid: ratatui::layout::Rect,
    pub activity: ratatui::layout::Rect,
    pub footer: ratatui::layout::Rect,
}

pub fn body_layout(area: ratatui::layout::Rect, side_width: u16) -> BodyLayout {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(8),    // Side panel + keymap grid
            Constraint::Length(7), // Activity log
            Constraint::Length(2), // Footer
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(side_width), Constraint::Min(0)])
        .split(root[1]);

    BodyLayout {
        header: root[0],
        body: root[1],
        side: columns[0],
        grid: columns[1],
        activity: root[2],
        footer: root[3],
    }
}

pub struct App {
    pub store: Arc<Store>,
    pub popover: Popover<TerminalLayout>,
    pub settings: Settings,
    /// Where `save_configuration` writes the edited keymaps
    pub config_path: Option<PathBuf>,
    pub keymap_index: usize,
    pub layer: usize,
    pub slot: usize,
    pub status: String,
    pub activity: Vec<String>,
    pub area: ratatui::layout::Rect,
    animation_started: Option<Instant>,
}

impl App {
    pub fn new(store: Arc<Store>, settings: Settings, config_path: Option<PathBuf>) -> Self {
        let layout = TerminalLayout {
            metrics: CellMetrics::default(),
            popover_width_px: settings.popover().width,
        };
        let popover = Popover::new(store.clone(), layout, settings.popover_config());
        let keymap_index = store
            .select(|state| get_keymaps(state).iter().position(|k| k.is_default))
            .unwrap_or(0);

        Self {
            store,
            popover,
            settings,
            config_path,
            keymap_index,
            layer: 0,
            slot: 0,
            status: "Ready".to_string(),
            activity: vec![],
            area: ratatui::layout::Rect::default(),
            animation_started: None,
        }
    }

    pub fn set_status<S: Into<String>>(&mut self, msg: S) {
        self.status = msg.into();
    }

    pub fn push_activity<S: AsRef<str>>(&mut self, msg: S) {
        for line in msg.as_ref().lines() {
            self.activity.push(line.to_string());
        }
        if self.activity.len() > MAX_ACTIVITY_LINES {
            let overflow = self.activity.len() - MAX_ACTIVITY_LINES;
            self.activity.drain(0..overflow);
        }
    }

    pub fn metrics(&self) -> CellMetrics {
        self.popover.layout().metrics
    }

    /// Width of the keymap side panel, matching the popover's side panel offset
    pub fn side_width(&self) -> u16 {
        self.metrics()
            .columns_for(self.settings.popover().side_panel_offset)
    }

    pub fn layout(&self) -> BodyLayout {
        body_layout(self.area, self.side_width())
    }

    pub fn resize(&mut self, area: ratatui::layout::Rect) {
        self.area = area;
    }

    pub fn keymap(&self) -> Option<Keymap> {
        self.store
            .select(|state| get_keymaps(state).get(self.keymap_index).cloned())
    }

    pub fn keymap_names(&self) -> Vec<(String, String)> {
        self.store.select(|state| {
            store::get_keymap_options(state)
                .into_iter()
                .map(|option| (option.value, option.label))
                .collect()
        })
    }

    pub fn device_ready(&self) -> bool {
        self.store
            .select(|state| store::device_connected(state) && store::has_device_permission(state))
    }

    pub fn slot_count(&self) -> usize {
        self.keymap().map(|k| k.slot_count()).unwrap_or(0)
    }

    pub fn selected_action(&self) -> KeyAction {
        self.keymap()
            .and_then(|k| k.key_action(self.layer, self.slot).cloned())
            .unwrap_or_default()
    }

    /// Cell rectangle of a key slot in the grid
    pub fn key_area(&self, slot: usize) -> ratatui::layout::Rect {
        let grid = self.layout().grid;
        let column = (slot % KEY_COLUMNS) as u16;
        let row = (slot / KEY_COLUMNS) as u16;
        ratatui::layout::Rect::new(
            grid.x + 1 + column * KEY_WIDTH,
            grid.y + 1 + row * KEY_HEIGHT,
            KEY_WIDTH,
            KEY_HEIGHT,
        )
        .intersection(self.area)
    }

    /// Cell rectangle of the popover, from its computed pixel position
    pub fn popover_area(&self) -> ratatui::layout::Rect {
        let metrics = self.metrics();
        let session = self.popover.session();
        let width = metrics
            .columns_for(self.popover.layout().popover_width())
            .min(self.area.width);
        let height = POPOVER_HEIGHT.min(self.area.height);
        let x = metrics
            .column(session.left_px)
            .min(self.area.right().saturating_sub(width));
        let y = metrics
            .row(session.top_px)
            .min(self.area.bottom().saturating_sub(height));
        ratatui::layout::Rect::new(x, y, width, height)
    }

    pub fn move_selection(&mut self, dx: isize, dy: isize) {
        let count = self.slot_count();
        if count == 0 {
            return;
        }
        let rows = count.div_ceil(KEY_COLUMNS);
        let column = (self.slot % KEY_COLUMNS) as isize + dx;
        let row = (self.slot / KEY_COLUMNS) as isize + dy;
        let column = column.clamp(0, KEY_COLUMNS as isize - 1) as usize;
        let row = row.clamp(0, rows as isize - 1) as usize;
        self.slot = (row * KEY_COLUMNS + column).min(count - 1);
    }

    pub fn next_layer(&mut self) {
        self.layer = (self.layer + 1) % LAYER_COUNT;
        self.set_status(format!("Layer {}", LAYER_NAMES[self.layer]));
    }

    pub fn previous_layer(&mut self) {
        self.layer = (self.layer + LAYER_COUNT - 1) % LAYER_COUNT;
        self.set_status(format!("Layer {}", LAYER_NAMES[self.layer]));
    }

    pub fn cycle_keymap(&mut self, forward: bool) {
        let count = self.store.select(|state| get_keymaps(state).len());
        if count == 0 {
            return;
        }
        self.keymap_index = if forward {
            (self.keymap_index + 1) % count
        } else {
            (self.keymap_index + count - 1) % count
        };
        self.slot = self.slot.min(self.slot_count().saturating_sub(1));
        if let Some(keymap) = self.keymap() {
            self.set_status(format!("Keymap {}", keymap.name));
        }
    }

    /// Open the popover for the selected key
    pub fn open_popover(&mut self) {
        let Some(keymap) = self.keymap() else {
            self.set_status("No keymap loaded");
            return;
        };
        let target = RemapTarget {
            keymap_abbreviation: keymap.abbreviation.clone(),
            layer: self.layer,
            slot: self.slot,
        };
        if !self.dispatch(Intent::OpenRemap(target)) {
            return;
        }

        let metrics = self.metrics();
        let key = metrics.to_px(self.key_area(self.slot));
        let container = metrics.to_px(self.layout().body);
        let remap = self.settings.remap();
        let changes = PopoverChanges::new()
            .animation_enabled(self.settings.popover().animation_enabled)
            .allow_layer_double_tap(remap.allow_layer_double_tap)
            .current_layer(self.layer)
            .key_position(Some(key))
            .container(Some(container))
            .remap_scope(self.settings.default_scope())
            .key_action(self.selected_action())
            .visible(true);
        self.popover.apply_changes(changes);
        self.start_animation();
        log::debug!(
            "Opened popover for {}:{}:{}",
            keymap.abbreviation,
            self.layer,
            self.slot
        );
        self.forward_popover_events();
    }

    pub fn close_popover(&mut self) {
        if !self.popover.inputs().visible {
            return;
        }
        self.popover
            .apply_changes(PopoverChanges::new().visible(false));
        self.start_animation();
    }

    fn start_animation(&mut self) {
        self.animation_started = if self.popover.animation_duration().is_zero() {
            None
        } else {
            Some(Instant::now())
        };
    }

    /// Advance the open/close animation
    pub fn tick(&mut self) {
        if let Some(started) = self.animation_started {
            if started.elapsed() >= self.popover.animation_duration() {
                self.popover.complete_animation();
                self.animation_started = None;
            }
        }
    }

    /// Hand popover events to the store and close the popover when done
    pub fn forward_popover_events(&mut self) {
        for event in self.popover.drain_events() {
            match event {
                PopoverEvent::Remap(remap) => {
                    let summary = format!(
                        "{} {}:{} -> {}{}",
                        self.keymap().map(|k| k.abbreviation).unwrap_or_default(),
                        LAYER_NAMES[self.layer],
                        self.slot,
                        remap.action,
                        scope_suffix(remap.scope)
                    );
                    if self.dispatch(Intent::FinalizeRemap(remap)) {
                        self.set_status("Remap applied");
                        self.push_activity(summary);
                    } else {
                        self.dispatch(Intent::CancelRemap);
                    }
                    self.close_popover();
                }
                PopoverEvent::Cancel => {
                    self.dispatch(Intent::CancelRemap);
                    self.set_status("Cancelled");
                    self.close_popover();
                }
                PopoverEvent::RenderRequested => log::trace!("Popover requested a redraw"),
            }
        }
    }

    pub fn save_configuration(&mut self) {
        let Some(path) = self.config_path.clone() else {
            self.set_status("No configuration path to save to");
            return;
        };
        let config = self
            .store
            .select(|state| get_user_configuration(state).clone());
        match config.save(&path) {
            Ok(()) => {
                self.set_status("Configuration saved");
                self.push_activity(format!("Saved {}", path.display()));
            }
            Err(err) => {
                log::error!("Saving {} failed: {}", path.display(), err);
                self.set_status("Save failed");
                self.push_activity(format!("Save error: {}", err));
            }
        }
    }

    fn dispatch(&mut self, intent: Intent) -> bool {
        match self.store.dispatch(intent) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Store rejected intent: {}", err);
                self.set_status(format!("Error: {}", err));
                false
            }
        }
    }
}

fn scope_suffix(scope: RemapScope) -> &'static str {
    match (scope.apply_to_all_keymaps, scope.apply_to_all_layers) {
        (true, true) => " (all keymaps, all layers)",
        (true, false) => " (all keymaps)",
        (false, true) => " (all layers)",
        (false, false) => "",
    }
}
