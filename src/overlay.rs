use crate::constants::*;
use crate::dom;
use sensory_core::{Observer, PresetStore, StateManager};
use serde_json::Value;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Shows the most recent recorded changes while debug mode is on.
pub struct DebugPanel {
    document: web::Document,
    store: Weak<StateManager>,
}

impl DebugPanel {
    pub fn new(document: web::Document, store: &Rc<StateManager>) -> Self {
        Self {
            document,
            store: Rc::downgrade(store),
        }
    }
}

impl Observer for DebugPanel {
    fn update(&self, new_state: &Value, _old_state: &Value) -> anyhow::Result<()> {
        let Some(panel) = self.document.get_element_by_id(DEBUG_PANEL_ID) else {
            return Ok(());
        };
        let debug = new_state["debug"].as_bool().unwrap_or(false);
        dom::set_hidden(&panel, !debug);
        if !debug {
            return Ok(());
        }
        let Some(store) = self.store.upgrade() else {
            return Ok(());
        };
        let history = store.history();
        let lines: Vec<String> = history
            .iter()
            .rev()
            .take(DEBUG_HISTORY_ROWS)
            .map(|entry| {
                let changes: Vec<String> = entry
                    .changes
                    .iter()
                    .map(|(path, c)| {
                        format!(
                            "{path}: {} -> {}",
                            c.from.as_ref().map_or("-".to_string(), Value::to_string),
                            c.to.as_ref().map_or("-".to_string(), Value::to_string)
                        )
                    })
                    .collect();
                format!("[{}] {:.2}ms {}", entry.source, entry.duration, changes.join(", "))
            })
            .collect();
        panel.set_text_content(Some(&lines.join("\n")));
        Ok(())
    }
}

/// Marks whether the live settings still match the last applied preset.
pub struct PresetStatus {
    document: web::Document,
    presets: Weak<PresetStore>,
}

impl PresetStatus {
    pub fn new(document: web::Document, presets: &Rc<PresetStore>) -> Self {
        Self {
            document,
            presets: Rc::downgrade(presets),
        }
    }

    pub fn refresh(&self) {
        if let Some(presets) = self.presets.upgrade() {
            show_preset_status(&self.document, &presets);
        }
    }
}

impl Observer for PresetStatus {
    fn update(&self, _new_state: &Value, _old_state: &Value) -> anyhow::Result<()> {
        self.refresh();
        Ok(())
    }
}

pub fn show_preset_status(document: &web::Document, presets: &PresetStore) {
    let text = match presets.active_preset() {
        Some(name) if presets.has_state_changed() => format!("{name} (modified)"),
        Some(name) => name,
        None => "custom".to_string(),
    };
    dom::set_text(document, PRESET_STATUS_ID, &text);
}

/// Rebuild the preset dropdown, grouped by category order then name.
pub fn refresh_preset_list(document: &web::Document, presets: &PresetStore) {
    let Some(select) = document
        .get_element_by_id(PRESET_SELECT_ID)
        .and_then(|el| el.dyn_into::<web::HtmlSelectElement>().ok())
    else {
        return;
    };
    select.set_length(0);
    for category in presets.categories() {
        for (name, _) in presets.get_presets(Some(category.as_str())) {
            let label = format!("{category} / {name}");
            match web::HtmlOptionElement::new_with_text_and_value(&label, &name) {
                Ok(opt) => {
                    _ = select.add_with_html_option_element(&opt);
                }
                Err(e) => log::warn!("[presets] option element error: {e:?}"),
            }
        }
    }
    if let Some(active) = presets.active_preset() {
        select.set_value(&active);
    }
}
