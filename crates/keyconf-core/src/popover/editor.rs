// Keyconf Popover Editor
// State machine behind the floating key editor

use std::sync::Arc;
use std::time::Duration;

use crate::action::{KeyAction, KeystrokeAction};
use crate::keymap::BASE_LAYER;
use crate::popover::event::PopoverEvent;
use crate::popover::geometry::{compute_placement, FixedLayout, GeometryConfig, LayoutProvider, Rect};
use crate::popover::tab::{
    compute_tab_availability, TabContext, TabEdit, TabEditors, TabHeader, TabKind, TAB_COUNT,
};
use crate::remap::{KeyActionRemap, RemapScope};
use crate::store::Store;

/// Length of the open/close animation when animations are enabled
pub const ANIMATION_DURATION_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationPhase {
    #[default]
    Closed,
    Opening,
    Opened,
    Closing,
}

/// Everything the host supplies to the popover
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopoverInputs {
    pub key_action: KeyAction,
    pub current_layer: usize,
    pub key_position: Option<Rect>,
    pub container: Option<Rect>,
    pub remap_scope: RemapScope,
    pub visible: bool,
    pub animation_enabled: bool,
    pub allow_layer_double_tap: bool,
}

/// A batch of changed inputs. Unset fields are left as they are.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopoverChanges {
    pub key_action: Option<KeyAction>,
    pub current_layer: Option<usize>,
    pub key_position: Option<Option<Rect>>,
    pub container: Option<Option<Rect>>,
    pub remap_scope: Option<RemapScope>,
    pub visible: Option<bool>,
    pub animation_enabled: Option<bool>,
    pub allow_layer_double_tap: Option<bool>,
}

impl PopoverChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_action(mut self, action: KeyAction) -> Self {
        self.key_action = Some(action);
        self
    }

    pub fn current_layer(mut self, layer: usize) -> Self {
        self.current_layer = Some(layer);
        self
    }

    pub fn key_position(mut self, rect: Option<Rect>) -> Self {
        self.key_position = Some(rect);
        self
    }

    pub fn container(mut self, rect: Option<Rect>) -> Self {
        self.container = Some(rect);
        self
    }

    pub fn remap_scope(mut self, scope: RemapScope) -> Self {
        self.remap_scope = Some(scope);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn animation_enabled(mut self, enabled: bool) -> Self {
        self.animation_enabled = Some(enabled);
        self
    }

    pub fn allow_layer_double_tap(mut self, allow: bool) -> Self {
        self.allow_layer_double_tap = Some(allow);
        self
    }
}

/// Observable state of one popover session
#[derive(Debug, Clone, PartialEq)]
pub struct PopoverSession {
    pub is_visible: bool,
    pub animation_phase: AnimationPhase,
    /// Tab picked for the current key action, activated on show
    pub candidate_tab: TabKind,
    pub active_tab: TabKind,
    pub tabs: [TabHeader; TAB_COUNT],
    pub shadow_key_action: Option<KeyAction>,
    pub is_current_edit_valid: bool,
    /// Scope after the cross-layer override
    pub remap_scope: RemapScope,
    /// Set while "remap on all layers" must stay off
    pub disable_remap_on_all_layer: bool,
    pub left_px: f64,
    pub top_px: f64,
    pub show_left_arrow: bool,
    pub show_right_arrow: bool,
}

impl Default for PopoverSession {
    fn default() -> Self {
        Self {
            is_visible: false,
            animation_phase: AnimationPhase::Closed,
            candidate_tab: TabKind::None,
            active_tab: TabKind::None,
            tabs: compute_tab_availability(TabKind::None, BASE_LAYER),
            shadow_key_action: None,
            is_current_edit_valid: false,
            remap_scope: RemapScope::default(),
            disable_remap_on_all_layer: false,
            left_px: 0.0,
            top_px: 0.0,
            show_left_arrow: false,
            show_right_arrow: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PopoverConfig {
    pub geometry: GeometryConfig,
}

/// The floating key editor.
///
/// The host feeds input changes through [`Popover::apply_changes`], forwards
/// user interaction through the remaining methods and drains
/// [`PopoverEvent`]s after each call.
pub struct Popover<L: LayoutProvider = FixedLayout> {
    store: Arc<Store>,
    layout: L,
    config: PopoverConfig,
    inputs: PopoverInputs,
    session: PopoverSession,
    editors: TabEditors,
    events: Vec<PopoverEvent>,
}

impl<L: LayoutProvider> Popover<L> {
    pub fn new(store: Arc<Store>, layout: L, config: PopoverConfig) -> Self {
        Self {
            store,
            layout,
            config,
            inputs: PopoverInputs::default(),
            session: PopoverSession::default(),
            editors: TabEditors::default(),
            events: Vec::new(),
        }
    }

    pub fn session(&self) -> &PopoverSession {
        &self.session
    }

    pub fn inputs(&self) -> &PopoverInputs {
        &self.inputs
    }

    pub fn editors(&self) -> &TabEditors {
        &self.editors
    }

    pub fn active_tab(&self) -> TabKind {
        self.session.active_tab
    }

    pub fn tabs(&self) -> &[TabHeader; TAB_COUNT] {
        &self.session.tabs
    }

    pub fn remap_scope(&self) -> RemapScope {
        self.session.remap_scope
    }

    pub fn is_visible(&self) -> bool {
        self.session.is_visible
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn animation_duration(&self) -> Duration {
        if self.inputs.animation_enabled {
            Duration::from_millis(ANIMATION_DURATION_MS)
        } else {
            Duration::ZERO
        }
    }

    /// Read views of the store as the tabs see them
    pub fn tab_context(&self) -> TabContext {
        let allow_double_tap = self.inputs.allow_layer_double_tap;
        self.store
            .select(|state| TabContext::from_state(state, allow_double_tap))
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<PopoverEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a batch of changed inputs
    pub fn apply_changes(&mut self, changes: PopoverChanges) {
        let geometry_changed = changes.key_position.is_some() || changes.container.is_some();
        let layer_changed = changes
            .current_layer
            .is_some_and(|layer| layer != self.inputs.current_layer);
        let visibility_change = changes.visible.filter(|v| *v != self.inputs.visible);

        if let Some(enabled) = changes.animation_enabled {
            self.inputs.animation_enabled = enabled;
        }
        if let Some(allow) = changes.allow_layer_double_tap {
            self.inputs.allow_layer_double_tap = allow;
        }
        if let Some(layer) = changes.current_layer {
            self.inputs.current_layer = layer;
        }
        if let Some(rect) = changes.key_position {
            self.inputs.key_position = rect;
        }
        if let Some(rect) = changes.container {
            self.inputs.container = rect;
        }
        if changes.key_action.is_some() {
            // The lockout belongs to the previous key until the new one is evaluated
            self.session.disable_remap_on_all_layer = false;
        }
        if let Some(scope) = changes.remap_scope {
            self.inputs.remap_scope = scope;
            self.set_scope(scope);
        }

        if geometry_changed {
            self.calculate_position();
        }

        if let Some(action) = changes.key_action {
            self.inputs.key_action = action;
            self.key_action_changed();
        } else if layer_changed {
            self.layer_changed();
        }

        if let Some(visible) = visibility_change {
            self.inputs.visible = visible;
            if visible {
                self.show();
            } else {
                self.hide();
            }
        }
    }

    /// Move the animation phase to its resting state
    pub fn complete_animation(&mut self) {
        self.session.animation_phase = match self.session.animation_phase {
            AnimationPhase::Opening => AnimationPhase::Opened,
            AnimationPhase::Closing => AnimationPhase::Closed,
            phase => phase,
        };
    }

    /// User-initiated tab switch. Disabled tabs are ignored.
    pub fn select_tab(&mut self, kind: TabKind) -> bool {
        if self.header(kind).disabled {
            log::debug!("Ignoring selection of disabled tab {}", kind);
            return false;
        }

        self.session.active_tab = kind;
        let action = self.inputs.key_action.clone();
        self.editors.seed(kind, &action, &self.session.remap_scope);
        if kind == TabKind::Keypress {
            self.keystroke_action_changed(self.editors.keypress.value);
        } else {
            self.session.shadow_key_action = self.editors.working_action(kind);
        }
        self.refresh_validity();
        true
    }

    /// Select the next enabled tab, wrapping around
    pub fn select_next_tab(&mut self) -> bool {
        self.select_relative_tab(1)
    }

    /// Select the previous enabled tab, wrapping around
    pub fn select_previous_tab(&mut self) -> bool {
        self.select_relative_tab(TAB_COUNT - 1)
    }

    fn select_relative_tab(&mut self, step: usize) -> bool {
        let start = self.session.active_tab.position();
        let next = (1..TAB_COUNT)
            .map(|i| self.session.tabs[(start + i * step) % TAB_COUNT])
            .find(|header| !header.disabled);
        match next {
            Some(header) => self.select_tab(header.kind),
            None => false,
        }
    }

    /// Edit the working value of the active tab
    pub fn edit(&mut self, edit: TabEdit) -> bool {
        let kind = self.session.active_tab;
        if edit.tab() != kind {
            log::debug!("Ignoring {:?} while the {} tab is active", edit, kind);
            return false;
        }
        if !self.editors.apply(edit) {
            return false;
        }

        if kind == TabKind::Keypress {
            self.keystroke_action_changed(self.editors.keypress.value);
        } else {
            self.session.shadow_key_action = self.editors.working_action(kind);
        }
        self.refresh_validity();
        true
    }

    /// Toggle "remap on all layers" from inside the panel
    pub fn set_apply_to_all_layers(&mut self, value: bool) -> bool {
        if value && self.session.disable_remap_on_all_layer {
            return false;
        }
        let scope = RemapScope {
            apply_to_all_layers: value,
            ..self.session.remap_scope
        };
        self.set_scope(scope);
        self.notify_render();
        true
    }

    /// Toggle "remap on all keymaps" from inside the panel
    pub fn set_apply_to_all_keymaps(&mut self, value: bool) {
        let scope = RemapScope {
            apply_to_all_keymaps: value,
            ..self.session.remap_scope
        };
        self.set_scope(scope);
        self.notify_render();
    }

    /// Emit the active tab's action if the edit is valid
    pub fn confirm(&mut self) -> bool {
        if !self.session.is_current_edit_valid {
            return false;
        }

        let kind = self.session.active_tab;
        match self.editors.to_key_action(kind, &self.tab_context()) {
            Ok(action) => {
                self.events.push(PopoverEvent::Remap(KeyActionRemap {
                    scope: self.session.remap_scope,
                    action,
                }));
                true
            }
            Err(err) => {
                // TODO: surface conversion failures to the user instead of only logging them
                log::error!("Cannot convert {} tab to a key action: {}", kind, err);
                false
            }
        }
    }

    /// Confirm shortcut: remap when valid, otherwise dismiss
    pub fn confirm_shortcut(&mut self) {
        if !self.session.is_visible {
            return;
        }
        if self.session.is_current_edit_valid {
            self.confirm();
        } else {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        self.events.push(PopoverEvent::Cancel);
    }

    pub fn escape(&mut self) {
        self.cancel();
    }

    pub fn overlay_click(&mut self) {
        self.cancel();
    }

    fn header(&self, kind: TabKind) -> TabHeader {
        self.session.tabs[kind.position()]
    }

    fn show(&mut self) {
        self.session.is_visible = true;
        self.session.animation_phase = if self.inputs.animation_enabled {
            AnimationPhase::Opening
        } else {
            AnimationPhase::Opened
        };

        let candidate = self.session.candidate_tab;
        let tab = if self.header(candidate).disabled && candidate != TabKind::Layer {
            TabKind::None
        } else {
            candidate
        };
        self.select_tab(tab);
    }

    fn hide(&mut self) {
        self.session.is_visible = false;
        self.session.animation_phase = if self.inputs.animation_enabled {
            AnimationPhase::Closing
        } else {
            AnimationPhase::Closed
        };
    }

    fn key_action_changed(&mut self) {
        self.session.disable_remap_on_all_layer = false;

        let action = self.inputs.key_action.clone();
        let candidate = TabKind::for_key_action(&action);
        self.session.candidate_tab = candidate;
        self.session.tabs = compute_tab_availability(candidate, self.inputs.current_layer);
        self.editors.seed_all(&action, &self.session.remap_scope);

        match action {
            KeyAction::Keystroke(keystroke) => self.keystroke_action_changed(keystroke),
            _ => self.session.shadow_key_action = self.editors.working_action(self.shown_tab()),
        }
        self.ensure_active_tab_enabled();
        self.refresh_validity();
    }

    fn layer_changed(&mut self) {
        self.session.tabs =
            compute_tab_availability(self.session.candidate_tab, self.inputs.current_layer);
        self.ensure_active_tab_enabled();
        if let Some(KeyAction::Keystroke(keystroke)) = self.session.shadow_key_action {
            self.keystroke_action_changed(keystroke);
        }
        self.refresh_validity();
    }

    /// Record a keystroke edit and re-evaluate the cross-layer lockout
    fn keystroke_action_changed(&mut self, keystroke: KeystrokeAction) {
        self.session.shadow_key_action = Some(KeyAction::Keystroke(keystroke));

        let disable = self.inputs.current_layer == BASE_LAYER
            && keystroke.has_layer_switch_secondary_role();
        if disable != self.session.disable_remap_on_all_layer {
            self.session.disable_remap_on_all_layer = disable;
            if disable {
                let scope = RemapScope {
                    apply_to_all_layers: false,
                    ..self.session.remap_scope
                };
                self.set_scope(scope);
            }
            self.notify_render();
        }
    }

    fn set_scope(&mut self, mut scope: RemapScope) {
        if self.session.disable_remap_on_all_layer {
            scope.apply_to_all_layers = false;
        }
        self.session.remap_scope = scope;
        self.editors.remap_info_changed(&scope);
        self.refresh_validity();
    }

    /// Tab whose value drives validation: the active one while shown
    fn shown_tab(&self) -> TabKind {
        if self.session.is_visible {
            self.session.active_tab
        } else {
            self.session.candidate_tab
        }
    }

    fn ensure_active_tab_enabled(&mut self) {
        if !self.header(self.session.active_tab).disabled {
            return;
        }
        if let Some(header) = self.session.tabs.iter().find(|h| !h.disabled) {
            self.session.active_tab = header.kind;
        }
    }

    fn refresh_validity(&mut self) {
        let valid = self
            .editors
            .is_valid(self.shown_tab(), &self.tab_context());
        if valid != self.session.is_current_edit_valid {
            self.session.is_current_edit_valid = valid;
            self.notify_render();
        }
    }

    fn calculate_position(&mut self) {
        let (Some(key), Some(container)) = (self.inputs.key_position, self.inputs.container) else {
            return;
        };
        let placement = compute_placement(&key, &container, &self.layout, &self.config.geometry);
        self.session.left_px = placement.left;
        self.session.top_px = placement.top;
        self.session.show_left_arrow = placement.left_arrow;
        self.session.show_right_arrow = placement.right_arrow;
    }

    fn notify_render(&mut self) {
        self.events.push(PopoverEvent::RenderRequested);
    }
}
