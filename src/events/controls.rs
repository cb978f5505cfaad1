use crate::constants::*;
use crate::dom;
use crate::input::{parse_control_value, ControlKind};
use crate::overlay;
use sensory_core::{nest, PresetError, PresetStore, StateManager, DEFAULT_CATEGORY};
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

fn read_control(el: &web::Element) -> Option<Value> {
    if let Some(input) = el.dyn_ref::<web::HtmlInputElement>() {
        let kind = ControlKind::from_input_type(&input.type_());
        return parse_control_value(kind, &input.value(), input.checked());
    }
    el.dyn_ref::<web::HtmlSelectElement>()
        .map(|s| Value::String(s.value()))
}

/// Route every `data-param` / `data-path` control into the store.
pub fn wire_state_controls(document: &web::Document, store: &Rc<StateManager>) {
    for el in dom::query_all(document, PARAM_SELECTOR) {
        let Some(param) = el.get_attribute("data-param") else {
            continue;
        };
        let store = store.clone();
        let source = el.clone();
        dom::add_listener(&el, "input", move |_| {
            if let Some(value) = read_control(&source) {
                let theme = source
                    .get_attribute("data-theme")
                    .unwrap_or_else(|| store.current_theme());
                store.set_theme_param(&param, value, &theme);
            }
        });
    }

    for el in dom::query_all(document, PATH_SELECTOR) {
        let Some(path) = el.get_attribute("data-path") else {
            continue;
        };
        let store = store.clone();
        let source = el.clone();
        dom::add_listener(&el, "input", move |_| {
            match read_control(&source).and_then(|v| nest(&path, v)) {
                Some(partial) => {
                    store.update_state(&partial, &format!("control:{path}"));
                }
                None => log::warn!("[controls] ignoring input for '{path}'"),
            }
        });
    }

    if let Some(select) = document.get_element_by_id(THEME_SELECT_ID) {
        let store = store.clone();
        let source = select.clone();
        dom::add_listener(&select, "change", move |_| {
            if let Some(Value::String(theme)) = read_control(&source) {
                if let Err(e) = store.set_theme(&theme) {
                    log::warn!("[controls] {e}");
                }
            }
        });
    }

    let store_reset = store.clone();
    dom::add_click_listener(document, RESET_THEME_ID, move || {
        let theme = store_reset.current_theme();
        if let Err(e) = store_reset.reset_theme(&theme) {
            log::warn!("[controls] {e}");
        }
    });
}

fn report(document: &web::Document, presets: &PresetStore, result: Result<(), PresetError>) {
    match result {
        Ok(()) => {
            overlay::refresh_preset_list(document, presets);
            overlay::show_preset_status(document, presets);
        }
        Err(e) => {
            log::warn!("[presets] {e}");
            dom::set_text(document, PRESET_STATUS_ID, &e.to_string());
        }
    }
}

/// Save / apply / delete buttons of the presets panel.
pub fn wire_preset_controls(document: &web::Document, presets: &Rc<PresetStore>) {
    let (doc, p) = (document.clone(), presets.clone());
    dom::add_click_listener(document, PRESET_SAVE_ID, move || {
        let name = dom::input_value(&doc, PRESET_NAME_ID).unwrap_or_default();
        let category = dom::input_value(&doc, PRESET_CATEGORY_ID)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let result = p.create_preset(&name, &category, "").and_then(|preset| {
            // A freshly saved preset describes the live settings exactly.
            p.apply_preset(&preset.name)
        });
        report(&doc, &p, result);
    });

    let (doc, p) = (document.clone(), presets.clone());
    dom::add_click_listener(document, PRESET_APPLY_ID, move || {
        let Some(name) = dom::input_value(&doc, PRESET_SELECT_ID) else {
            return;
        };
        let result = p.apply_preset(&name);
        report(&doc, &p, result);
    });

    let (doc, p) = (document.clone(), presets.clone());
    dom::add_click_listener(document, PRESET_DELETE_ID, move || {
        let Some(name) = dom::input_value(&doc, PRESET_SELECT_ID) else {
            return;
        };
        let result = p.delete_preset(&name);
        report(&doc, &p, result);
    });
}
