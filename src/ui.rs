//! Keeps the on-page controls in step with the state.

use crate::constants::*;
use crate::dom;
use crate::input::display_value;
use sensory_core::{lookup, Observer};
use serde_json::Value;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct UiController {
    document: web::Document,
}

impl UiController {
    pub fn new(document: web::Document) -> Self {
        Self { document }
    }

    fn sync_param_controls(&self, state: &Value, theme: &str) {
        let config = &state["themeConfigs"][theme];
        for el in dom::query_all(&self.document, PARAM_SELECTOR) {
            let owner = el.get_attribute("data-theme");
            let visible = owner.as_deref().map_or(true, |t| t == theme);
            dom::set_hidden(&el, !visible);
            if !visible {
                continue;
            }
            if let Some(param) = el.get_attribute("data-param") {
                if let Some(value) = config.get(&param) {
                    write_control(&el, value);
                }
            }
        }
    }

    fn sync_path_controls(&self, state: &Value) {
        for el in dom::query_all(&self.document, PATH_SELECTOR) {
            if let Some(value) = el
                .get_attribute("data-path")
                .and_then(|path| lookup(state, &path).cloned())
            {
                write_control(&el, &value);
            }
        }
    }
}

impl Observer for UiController {
    fn update(&self, new_state: &Value, _old_state: &Value) -> anyhow::Result<()> {
        let theme = new_state["currentTheme"].as_str().unwrap_or_default();
        if let Some(select) = self
            .document
            .get_element_by_id(THEME_SELECT_ID)
            .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
        {
            select.set_value(theme);
        }
        self.sync_param_controls(new_state, theme);
        self.sync_path_controls(new_state);
        if let Some(body) = self.document.body() {
            let paused = !new_state["isRunning"].as_bool().unwrap_or(true);
            _ = body.class_list().toggle_with_force("paused", paused);
        }
        Ok(())
    }
}

// Setting `.value` from script does not fire `input`, so this cannot loop.
fn write_control(el: &web::Element, value: &Value) {
    if let Some(input) = el.dyn_ref::<web::HtmlInputElement>() {
        if input.type_() == "checkbox" {
            input.set_checked(value.as_bool().unwrap_or(false));
        } else {
            input.set_value(&display_value(value));
        }
    } else if let Some(select) = el.dyn_ref::<web::HtmlSelectElement>() {
        select.set_value(&display_value(value));
    }
}
