use crate::dom;
use crate::keys::{action_for_key, next_theme, KeyAction};
use sensory_core::{PersistenceAdapter, StateManager, SNOWFLAKES, UNDERWATER};
use serde_json::json;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

const THEME_CYCLE: [&str; 2] = [SNOWFLAKES, UNDERWATER];

pub fn handle_global_keydown(
    ev: &web::KeyboardEvent,
    store: &StateManager,
    persistence: &PersistenceAdapter,
) {
    // Typing into a field should not trigger shortcuts.
    if ev
        .target()
        .and_then(|t| t.dyn_into::<web::HtmlInputElement>().ok())
        .is_some()
    {
        return;
    }
    let Some(action) = action_for_key(&ev.key()) else {
        return;
    };
    match action {
        KeyAction::ToggleDebug => {
            let enabled = !store.is_debug();
            store.set_debug_mode(enabled);
            log::info!("[keys] debug {}", if enabled { "on" } else { "off" });
        }
        KeyAction::ToggleRunning => {
            ev.prevent_default();
            let running = store
                .get_state_section("isRunning")
                .and_then(|v| v.as_bool())
                .unwrap_or(true);
            store.update_state(&json!({ "isRunning": !running }), "keys:toggleRunning");
        }
        KeyAction::SaveState => match persistence.save_state() {
            Ok(()) => log::info!("[keys] state saved"),
            Err(e) => log::warn!("[keys] save failed: {e}"),
        },
        KeyAction::NextTheme => {
            let current = store.current_theme();
            if let Some(next) = next_theme(&current, &THEME_CYCLE) {
                if let Err(e) = store.set_theme(next) {
                    log::warn!("[keys] {e}");
                }
            }
        }
        KeyAction::ResetTheme => {
            let current = store.current_theme();
            if let Err(e) = store.reset_theme(&current) {
                log::warn!("[keys] {e}");
            }
        }
    }
}

pub fn wire_global_keydown(store: Rc<StateManager>, persistence: Rc<PersistenceAdapter>) {
    let Some(window) = web::window() else {
        return;
    };
    dom::add_listener(&window, "keydown", move |ev| {
        if let Some(kev) = ev.dyn_ref::<web::KeyboardEvent>() {
            handle_global_keydown(kev, &store, &persistence);
        }
    });
}
