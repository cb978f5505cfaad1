#![cfg(target_arch = "wasm32")]
use sensory_core::{
    builtin_theme_defaults, Observer, ObserverHandle, PersistenceAdapter, PersistenceError,
    PresetStore, StateManager, GLOBAL_SCOPE,
};
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod input;
mod keys;
mod overlay;
mod storage;
mod ui;

use constants::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("sensory-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    // Store first; every consumer below receives it explicitly.
    let store = Rc::new(StateManager::new());
    for (theme, defaults) in builtin_theme_defaults() {
        store.register_theme(theme, defaults);
    }
    store.define_scope(CONTROLS_SCOPE, CONTROLS_SCOPE_PATHS);

    let persistence = Rc::new(PersistenceAdapter::new(
        store.clone(),
        storage::LocalStorage::open(),
    ));
    match persistence.load_state() {
        Ok(()) => {}
        Err(PersistenceError::NotFound(_)) => log::info!("[init] no saved state; using defaults"),
        Err(e) => log::warn!("[init] saved state ignored: {e}"),
    }
    let presets = Rc::new(PresetStore::new(store.clone(), persistence.clone()));
    log::info!(
        "[init] theme={} presets={}",
        store.current_theme(),
        presets.get_presets(None).len()
    );

    wire_observers(&document, &store, &persistence, &presets)?;
    events::wire_state_controls(&document, &store);
    events::wire_preset_controls(&document, &presets);
    events::wire_global_keydown(store, persistence);
    Ok(())
}

fn wire_observers(
    document: &web::Document,
    store: &Rc<StateManager>,
    persistence: &Rc<PersistenceAdapter>,
    presets: &Rc<PresetStore>,
) -> anyhow::Result<()> {
    let ui = Rc::new(ui::UiController::new(document.clone()));
    // Controls start out showing whatever was restored.
    ui.update(&store.get_state(), &Value::Null)?;
    store.subscribe(ui, CONTROLS_SCOPE);

    let autosave: ObserverHandle = Rc::new(storage::AutoSave::new(persistence));
    store.subscribe(autosave, GLOBAL_SCOPE);

    let debug_panel: ObserverHandle = Rc::new(overlay::DebugPanel::new(document.clone(), store));
    debug_panel.update(&store.get_state(), &Value::Null)?;
    store.subscribe(debug_panel, GLOBAL_SCOPE);

    let status = Rc::new(overlay::PresetStatus::new(document.clone(), presets));
    status.refresh();
    store.subscribe(status, GLOBAL_SCOPE);

    overlay::refresh_preset_list(document, presets);
    Ok(())
}
