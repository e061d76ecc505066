// Keyconf Popover Scenarios
//
// Drives the popover the way a host does: input changes in, user
// interaction in, events out, and the store updated from those events.
//
// Run with: cargo test --test popover_scenarios

use std::sync::Arc;

use keyconf_core::store::{get_keymaps, FirmwareVersion, MACRO_PLAYBACK_MIN_FIRMWARE};
use keyconf_core::{
    AnimationPhase, AppState, FixedLayout, Intent, KeyAction, KeystrokeAction, LayerName,
    MouseAction, MouseActionParam, PlayMacroAction, Popover, PopoverChanges, PopoverConfig,
    PopoverEvent, Rect, RemapScope, RemapTarget, Scancode, SecondaryRoleAction, Store,
    SwitchKeymapAction, SwitchLayerAction, SwitchLayerMode, TabEdit, TabKind, UserConfiguration,
};

// =========================================================================
// Test Helpers
// =========================================================================

fn state_with_firmware(firmware: Option<FirmwareVersion>) -> AppState {
    let mut state = AppState {
        user_configuration: UserConfiguration::builtin(),
        ..AppState::default()
    };
    state.device.firmware_version = firmware;
    state
}

fn popover_for(store: Arc<Store>) -> Popover {
    Popover::new(store, FixedLayout::new(300.0, 0.0), PopoverConfig::default())
}

fn new_popover() -> Popover {
    popover_for(Arc::new(Store::new(state_with_firmware(None))))
}

/// Feed a key action on a layer and open the popover
fn open_with(popover: &mut Popover, action: KeyAction, layer: usize) {
    popover.apply_changes(
        PopoverChanges::new()
            .current_layer(layer)
            .key_action(action)
            .visible(true),
    );
    popover.drain_events();
}

fn key_a() -> KeystrokeAction {
    KeystrokeAction::from_scancode(4u16)
}

// =========================================================================
// Tab selection
// =========================================================================

#[test]
fn test_active_tab_follows_key_action() {
    let cases = [
        (KeyAction::Keystroke(key_a()), TabKind::Keypress),
        (
            KeyAction::SwitchLayer(SwitchLayerAction {
                layer: LayerName::Fn,
                mode: SwitchLayerMode::Toggle,
            }),
            TabKind::Layer,
        ),
        (
            KeyAction::Mouse(MouseAction {
                action: MouseActionParam::ScrollUp,
            }),
            TabKind::Mouse,
        ),
        (
            KeyAction::PlayMacro(PlayMacroAction { macro_id: 1 }),
            TabKind::Macro,
        ),
        (
            KeyAction::SwitchKeymap(SwitchKeymapAction {
                keymap_abbreviation: "DVR".to_string(),
            }),
            TabKind::Keymap,
        ),
        (KeyAction::None, TabKind::None),
    ];

    for (action, expected) in cases {
        let mut popover = new_popover();
        open_with(&mut popover, action.clone(), 0);
        assert_eq!(popover.active_tab(), expected, "for {}", action);
        assert!(popover.tabs().iter().all(|h| !h.disabled));
    }
}

#[test]
fn test_layer_switch_off_base_layer_locks_tabs() {
    let mut popover = new_popover();
    let action = KeyAction::SwitchLayer(SwitchLayerAction {
        layer: LayerName::Mouse,
        mode: SwitchLayerMode::Hold,
    });
    open_with(&mut popover, action, 2);

    assert_eq!(popover.active_tab(), TabKind::Layer);
    for header in popover.tabs() {
        assert_eq!(header.disabled, header.kind != TabKind::Layer);
    }

    // Selecting a disabled tab is a no-op
    assert!(!popover.select_tab(TabKind::Keypress));
    assert_eq!(popover.active_tab(), TabKind::Layer);
}

#[test]
fn test_non_layer_action_off_base_layer_keeps_all_tabs() {
    let mut popover = new_popover();
    open_with(&mut popover, KeyAction::Keystroke(key_a()), 3);
    assert!(popover.tabs().iter().all(|h| !h.disabled));
    assert!(popover.select_tab(TabKind::Mouse));
    assert_eq!(popover.active_tab(), TabKind::Mouse);
}

// =========================================================================
// Cross-layer override
// =========================================================================

#[test]
fn test_layer_secondary_role_forces_single_layer_remap() {
    let mut popover = new_popover();
    popover.apply_changes(PopoverChanges::new().remap_scope(RemapScope::new(false, true)));
    popover.drain_events();

    let keystroke = key_a().with_secondary_role(SecondaryRoleAction::Fn);
    popover.apply_changes(
        PopoverChanges::new()
            .current_layer(0)
            .key_action(keystroke.into())
            .visible(true),
    );

    let events = popover.drain_events();
    assert!(events.contains(&PopoverEvent::RenderRequested));
    assert!(popover.session().disable_remap_on_all_layer);
    assert!(!popover.remap_scope().apply_to_all_layers);

    // The toggle stays off while the lockout holds
    assert!(!popover.set_apply_to_all_layers(true));
    assert!(!popover.remap_scope().apply_to_all_layers);

    assert!(popover.confirm());
    assert_eq!(
        popover.drain_events(),
        vec![PopoverEvent::Remap(keyconf_core::KeyActionRemap {
            scope: RemapScope::new(false, false),
            action: KeyAction::Keystroke(keystroke),
        })]
    );
}

#[test]
fn test_modifier_secondary_role_does_not_lock_scope() {
    let mut popover = new_popover();
    let keystroke = key_a().with_secondary_role(SecondaryRoleAction::LeftShift);
    open_with(&mut popover, keystroke.into(), 0);

    assert!(!popover.session().disable_remap_on_all_layer);
    assert!(popover.set_apply_to_all_layers(true));
    assert!(popover.remap_scope().apply_to_all_layers);
}

#[test]
fn test_clearing_secondary_role_lifts_lockout() {
    let mut popover = new_popover();
    let keystroke = key_a().with_secondary_role(SecondaryRoleAction::Mouse);
    open_with(&mut popover, keystroke.into(), 0);
    assert!(popover.session().disable_remap_on_all_layer);

    assert!(popover.edit(TabEdit::SetSecondaryRole(None)));
    assert!(!popover.session().disable_remap_on_all_layer);
    assert!(popover.set_apply_to_all_layers(true));
}

#[test]
fn test_lockout_does_not_carry_into_next_session() {
    let mut popover = new_popover();
    let all_layers = RemapScope::new(false, true);

    let fn_role = key_a().with_secondary_role(SecondaryRoleAction::Fn);
    popover.apply_changes(
        PopoverChanges::new()
            .current_layer(0)
            .remap_scope(all_layers)
            .key_action(fn_role.into())
            .visible(true),
    );
    assert!(popover.session().disable_remap_on_all_layer);
    assert!(!popover.remap_scope().apply_to_all_layers);
    popover.apply_changes(PopoverChanges::new().visible(false));

    // Same batch a host sends when opening on the next key
    popover.apply_changes(
        PopoverChanges::new()
            .current_layer(0)
            .remap_scope(all_layers)
            .key_action(KeystrokeAction::from_scancode(5u16).into())
            .visible(true),
    );
    assert!(!popover.session().disable_remap_on_all_layer);
    assert_eq!(popover.remap_scope(), all_layers);

    popover.drain_events();
    assert!(popover.confirm());
    assert_eq!(
        popover.drain_events(),
        vec![PopoverEvent::Remap(keyconf_core::KeyActionRemap {
            scope: all_layers,
            action: KeyAction::Keystroke(KeystrokeAction::from_scancode(5u16)),
        })]
    );
}

// =========================================================================
// Confirm and cancel
// =========================================================================

#[test]
fn test_invalid_edit_is_not_confirmed() {
    let mut popover = new_popover();
    open_with(&mut popover, KeyAction::None, 0);

    // A fresh keystroke has neither a key nor a modifier
    assert!(popover.select_tab(TabKind::Keypress));
    assert!(!popover.session().is_current_edit_valid);
    popover.drain_events();

    assert!(!popover.confirm());
    assert!(popover.drain_events().is_empty());
}

#[test]
fn test_confirm_shortcut_dismisses_invalid_edit() {
    let mut popover = new_popover();
    open_with(&mut popover, KeyAction::None, 0);
    popover.select_tab(TabKind::Mouse);
    popover.drain_events();

    popover.confirm_shortcut();
    assert_eq!(popover.drain_events(), vec![PopoverEvent::Cancel]);
}

#[test]
fn test_confirm_shortcut_ignored_while_hidden() {
    let mut popover = new_popover();
    popover.apply_changes(PopoverChanges::new().key_action(key_a().into()));
    popover.drain_events();

    popover.confirm_shortcut();
    assert!(popover.drain_events().is_empty());
}

#[test]
fn test_cancel_emits_exactly_one_event() {
    let dismissals: [fn(&mut Popover); 3] =
        [Popover::cancel, Popover::escape, Popover::overlay_click];
    for dismiss in dismissals {
        let mut popover = new_popover();
        open_with(&mut popover, KeyAction::Keystroke(key_a()), 0);
        dismiss(&mut popover);
        assert_eq!(popover.drain_events(), vec![PopoverEvent::Cancel]);
    }
}

#[test]
fn test_macro_tab_needs_firmware_support() {
    let mut popover = new_popover();
    open_with(
        &mut popover,
        KeyAction::PlayMacro(PlayMacroAction { macro_id: 0 }),
        0,
    );
    assert_eq!(popover.active_tab(), TabKind::Macro);
    assert!(!popover.session().is_current_edit_valid);

    let store = Arc::new(Store::new(state_with_firmware(Some(
        MACRO_PLAYBACK_MIN_FIRMWARE,
    ))));
    let mut popover = popover_for(store);
    open_with(
        &mut popover,
        KeyAction::PlayMacro(PlayMacroAction { macro_id: 0 }),
        0,
    );
    assert!(popover.session().is_current_edit_valid);

    // Macro ids outside the configuration are rejected
    assert!(popover.edit(TabEdit::SetMacro(42)));
    assert!(!popover.session().is_current_edit_valid);
}

#[test]
fn test_extra_mouse_buttons_need_firmware_support() {
    let mut popover = new_popover();
    open_with(&mut popover, KeyAction::None, 0);
    popover.select_tab(TabKind::Mouse);

    assert!(popover.edit(TabEdit::SetMouseAction(MouseActionParam::Button5)));
    assert!(!popover.session().is_current_edit_valid);
    assert!(popover.edit(TabEdit::SetMouseAction(MouseActionParam::RightClick)));
    assert!(popover.session().is_current_edit_valid);
}

// =========================================================================
// Geometry
// =========================================================================

#[test]
fn test_popover_is_placed_under_the_key() {
    let mut popover = new_popover();
    popover.apply_changes(
        PopoverChanges::new()
            .key_position(Some(Rect::new(300.0, 100.0, 40.0, 40.0)))
            .container(Some(Rect::new(0.0, 0.0, 800.0, 600.0))),
    );

    let session = popover.session();
    assert_eq!(session.top_px, 147.0);
    assert_eq!(session.left_px, 170.0);
    assert!(!session.show_left_arrow);
    assert!(!session.show_right_arrow);
}

#[test]
fn test_missing_container_keeps_previous_position() {
    let mut popover = new_popover();
    popover.apply_changes(
        PopoverChanges::new().key_position(Some(Rect::new(300.0, 100.0, 40.0, 40.0))),
    );
    assert_eq!(popover.session().top_px, 0.0);
    assert_eq!(popover.session().left_px, 0.0);
}

// =========================================================================
// Re-showing
// =========================================================================

#[test]
fn test_reshow_discards_unconfirmed_edits() {
    let mut popover = new_popover();
    open_with(&mut popover, KeyAction::Keystroke(key_a()), 0);
    let first = popover.session().clone();

    assert!(popover.edit(TabEdit::SetScancode(Some(Scancode::from(5u16)))));
    assert_ne!(popover.session().shadow_key_action, first.shadow_key_action);

    popover.apply_changes(PopoverChanges::new().visible(false));
    assert_eq!(popover.session().animation_phase, AnimationPhase::Closed);
    popover.apply_changes(PopoverChanges::new().visible(true));

    assert_eq!(popover.editors().keypress.value, key_a());
    assert_eq!(popover.session(), &first);
}

#[test]
fn test_hide_show_only_changes_visibility_and_phase() {
    let mut popover = new_popover();
    popover.apply_changes(PopoverChanges::new().animation_enabled(true));
    open_with(&mut popover, KeyAction::Keystroke(key_a()), 1);
    popover.complete_animation();
    let shown = popover.session().clone();

    popover.apply_changes(PopoverChanges::new().visible(false));
    let hidden = popover.session().clone();
    assert!(!hidden.is_visible);
    assert_eq!(hidden.animation_phase, AnimationPhase::Closing);
    assert_eq!(
        hidden,
        keyconf_core::PopoverSession {
            is_visible: false,
            animation_phase: AnimationPhase::Closing,
            ..shown.clone()
        }
    );

    popover.apply_changes(PopoverChanges::new().visible(true));
    popover.complete_animation();
    assert_eq!(popover.session(), &shown);
}

// =========================================================================
// Store round trip
// =========================================================================

fn open_remap(store: &Store, popover: &mut Popover, keymap: &str, layer: usize, slot: usize) {
    let target = RemapTarget {
        keymap_abbreviation: keymap.to_string(),
        layer,
        slot,
    };
    store.dispatch(Intent::OpenRemap(target)).unwrap();
    let action = store
        .select(|state| {
            get_keymaps(state)
                .iter()
                .find(|k| k.abbreviation == keymap)
                .and_then(|k| k.key_action(layer, slot).cloned())
        })
        .unwrap();
    open_with(popover, action, layer);
}

/// Forward popover events to the store the way a host does
fn forward_events(store: &Store, popover: &mut Popover) {
    for event in popover.drain_events() {
        match event {
            PopoverEvent::Remap(remap) => store.dispatch(Intent::FinalizeRemap(remap)).unwrap(),
            PopoverEvent::Cancel => store.dispatch(Intent::CancelRemap).unwrap(),
            PopoverEvent::RenderRequested => {}
        }
    }
}

#[test]
fn test_confirmed_edit_updates_store() {
    let store = Arc::new(Store::new(state_with_firmware(None)));
    let mut popover = popover_for(store.clone());
    open_remap(&store, &mut popover, "QWR", 0, 0);
    assert_eq!(popover.active_tab(), TabKind::Keypress);

    popover.select_tab(TabKind::Mouse);
    popover.edit(TabEdit::SetMouseAction(MouseActionParam::LeftClick));
    assert!(popover.confirm());
    forward_events(&store, &mut popover);

    let state = store.snapshot();
    let mouse = KeyAction::Mouse(MouseAction {
        action: MouseActionParam::LeftClick,
    });
    assert_eq!(state.user_configuration.keymaps[0].key_action(0, 0), Some(&mouse));
    assert_ne!(state.user_configuration.keymaps[1].key_action(0, 0), Some(&mouse));
    assert_eq!(state.remap_target, None);
}

#[test]
fn test_confirmed_edit_across_keymaps_and_layers() {
    let store = Arc::new(Store::new(state_with_firmware(None)));
    let mut popover = popover_for(store.clone());
    open_remap(&store, &mut popover, "DVR", 0, 5);

    popover.set_apply_to_all_keymaps(true);
    popover.set_apply_to_all_layers(true);
    popover.select_tab(TabKind::None);
    assert!(popover.confirm());
    forward_events(&store, &mut popover);

    let state = store.snapshot();
    for keymap in &state.user_configuration.keymaps {
        for layer in 0..keymap.layers.len() {
            assert_eq!(keymap.key_action(layer, 5), Some(&KeyAction::None));
        }
    }
}

#[test]
fn test_cancel_clears_remap_target() {
    let store = Arc::new(Store::new(state_with_firmware(None)));
    let mut popover = popover_for(store.clone());
    open_remap(&store, &mut popover, "QWR", 1, 3);
    assert!(store.select(|state| state.remap_target.is_some()));

    popover.escape();
    forward_events(&store, &mut popover);
    assert!(store.select(|state| state.remap_target.is_none()));
    assert_eq!(
        store.snapshot().user_configuration,
        UserConfiguration::builtin()
    );
}
