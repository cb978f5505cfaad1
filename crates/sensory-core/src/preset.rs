//! Named snapshots of one theme's configuration.
//!
//! `PresetStore` keeps a cache of the persisted collection. Every mutating
//! operation builds the new collection, writes it through the
//! `PersistenceAdapter`, and only then swaps the cache, so a failed write
//! leaves both sides as they were.

use crate::constants::*;
use crate::error::PresetError;
use crate::history::now_ms;
use crate::persistence::PersistenceAdapter;
use crate::state::ThemeId;
use crate::store::StateManager;
use crate::value::merged;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Presets keyed by name.
pub type PresetMap = BTreeMap<String, Preset>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    // Imported records take their name from the collection key.
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub theme: ThemeId,
    pub config: Value,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub updated_at: f64,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Serialize the collection, optionally keeping only one category.
pub fn presets_to_json(presets: &PresetMap, category: Option<&str>) -> String {
    let filtered: PresetMap = presets
        .iter()
        .filter(|(_, p)| category.map_or(true, |c| p.category == c))
        .map(|(k, p)| (k.clone(), p.clone()))
        .collect();
    serde_json::to_string_pretty(&filtered).unwrap_or_else(|e| {
        log::error!("[presets] export failed: {e}");
        "{}".to_string()
    })
}

/// Merge a JSON object of presets into `existing`.
///
/// With `overwrite` the destination is cleared first and every valid record
/// is taken. Without it, names already present keep their existing preset and
/// only new names are added. Records that do not parse are skipped. Returns
/// the number of presets taken, or `None` (leaving `existing` untouched) when
/// `json` is not an object.
pub fn merge_imported(existing: &mut PresetMap, json: &str, overwrite: bool) -> Option<usize> {
    let incoming: Map<String, Value> = match serde_json::from_str(json) {
        Ok(map) => map,
        Err(e) => {
            log::warn!("[presets] import ignored, not a preset object: {e}");
            return None;
        }
    };
    if overwrite {
        existing.clear();
    }
    let mut count = 0;
    for (name, record) in incoming {
        if existing.contains_key(&name) {
            log::debug!("[presets] import keeps existing '{name}'");
            continue;
        }
        match serde_json::from_value::<Preset>(record) {
            Ok(mut preset) => {
                preset.name = name.clone();
                existing.insert(name, preset);
                count += 1;
            }
            Err(e) => log::warn!("[presets] skipping malformed preset '{name}': {e}"),
        }
    }
    Some(count)
}

pub struct PresetStore {
    store: Rc<StateManager>,
    persistence: Rc<PersistenceAdapter>,
    cache: RefCell<PresetMap>,
    active: RefCell<Option<ActivePreset>>,
}

/// The last applied preset and the theme config it produced.
struct ActivePreset {
    name: String,
    theme: ThemeId,
    baseline: Value,
}

impl PresetStore {
    /// Build the store and load whatever is persisted. An unreadable
    /// collection starts empty.
    pub fn new(store: Rc<StateManager>, persistence: Rc<PersistenceAdapter>) -> Self {
        let presets = Self {
            store,
            persistence,
            cache: RefCell::new(PresetMap::new()),
            active: RefCell::new(None),
        };
        if let Err(e) = presets.reload() {
            log::warn!("[presets] starting empty: {e}");
        }
        presets
    }

    /// Re-read the persisted collection into the cache.
    pub fn reload(&self) -> Result<(), PresetError> {
        let loaded = self.persistence.get_presets()?;
        let mut active = self.active.borrow_mut();
        if active.as_ref().is_some_and(|a| !loaded.contains_key(&a.name)) {
            *active = None;
        }
        *self.cache.borrow_mut() = loaded;
        Ok(())
    }

    fn commit(&self, next: PresetMap) -> Result<(), PresetError> {
        self.persistence.write_presets(&next)?;
        *self.cache.borrow_mut() = next;
        Ok(())
    }

    fn snapshot_current(&self) -> Result<(ThemeId, Value), PresetError> {
        let theme = self.store.current_theme();
        let config = self
            .store
            .theme_config(&theme)
            .ok_or_else(|| PresetError::MissingConfig(theme.clone()))?;
        Ok((theme, config))
    }

    /// Snapshot the active theme's config under `name`. An existing preset of
    /// the same name is replaced but keeps its creation time.
    pub fn create_preset(
        &self,
        name: &str,
        category: &str,
        description: &str,
    ) -> Result<Preset, PresetError> {
        let name = valid_name(name)?;
        let (theme, config) = self.snapshot_current()?;
        let now = now_ms();
        let mut next = self.cache.borrow().clone();
        let created_at = next.get(&name).map_or(now, |p| p.created_at);
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY,
            c => c,
        };
        let preset = Preset {
            name: name.clone(),
            category: category.to_string(),
            description: description.to_string(),
            theme,
            config,
            created_at,
            updated_at: now,
        };
        next.insert(name.clone(), preset.clone());
        self.commit(next)?;
        log::info!("[presets] saved '{name}' ({})", preset.theme);
        Ok(preset)
    }

    /// Push a preset's theme and config into the state and mark it active.
    pub fn apply_preset(&self, name: &str) -> Result<(), PresetError> {
        let preset = self
            .get_preset(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;
        let current = self.store.theme_config(&preset.theme).unwrap_or(Value::Null);
        let mut configs = Map::new();
        configs.insert(preset.theme.clone(), preset.config.clone());
        // Set before dispatch so observers already judge drift against it.
        *self.active.borrow_mut() = Some(ActivePreset {
            name: preset.name.clone(),
            theme: preset.theme.clone(),
            baseline: merged(&current, &preset.config),
        });
        self.store.update_state(
            &json!({
                "currentTheme": preset.theme,
                "themeConfigs": Value::Object(configs),
            }),
            &format!("applyPreset:{name}"),
        );
        Ok(())
    }

    /// Re-snapshot the current theme config into an existing preset.
    pub fn update_preset(&self, name: &str) -> Result<Preset, PresetError> {
        let mut next = self.cache.borrow().clone();
        let preset = next
            .get_mut(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;
        let (theme, config) = self.snapshot_current()?;
        preset.theme = theme.clone();
        preset.config = config.clone();
        preset.updated_at = now_ms();
        let updated = preset.clone();
        self.commit(next)?;
        if let Some(active) = self.active.borrow_mut().as_mut().filter(|a| a.name == name) {
            active.theme = theme;
            active.baseline = config;
        }
        Ok(updated)
    }

    pub fn delete_preset(&self, name: &str) -> Result<(), PresetError> {
        let mut next = self.cache.borrow().clone();
        if next.remove(name).is_none() {
            return Err(PresetError::NotFound(name.to_string()));
        }
        self.commit(next)?;
        let mut active = self.active.borrow_mut();
        if active.as_ref().is_some_and(|a| a.name == name) {
            *active = None;
        }
        Ok(())
    }

    pub fn rename_preset(&self, old_name: &str, new_name: &str) -> Result<(), PresetError> {
        let new_name = valid_name(new_name)?;
        let mut next = self.cache.borrow().clone();
        if !next.contains_key(old_name) {
            return Err(PresetError::NotFound(old_name.to_string()));
        }
        if new_name == old_name {
            return Ok(());
        }
        if next.contains_key(&new_name) {
            return Err(PresetError::NameTaken(new_name));
        }
        if let Some(mut preset) = next.remove(old_name) {
            preset.name = new_name.clone();
            preset.updated_at = now_ms();
            next.insert(new_name.clone(), preset);
        }
        self.commit(next)?;
        if let Some(active) = self.active.borrow_mut().as_mut() {
            if active.name == old_name {
                active.name = new_name;
            }
        }
        Ok(())
    }

    pub fn change_preset_category(&self, name: &str, category: &str) -> Result<(), PresetError> {
        let mut next = self.cache.borrow().clone();
        let preset = next
            .get_mut(name)
            .ok_or_else(|| PresetError::NotFound(name.to_string()))?;
        preset.category = category.to_string();
        preset.updated_at = now_ms();
        self.commit(next)
    }

    /// All presets, or only those in `category`.
    pub fn get_presets(&self, category: Option<&str>) -> PresetMap {
        self.cache
            .borrow()
            .iter()
            .filter(|(_, p)| category.map_or(true, |c| p.category == c))
            .map(|(k, p)| (k.clone(), p.clone()))
            .collect()
    }

    pub fn get_preset(&self, name: &str) -> Option<Preset> {
        self.cache.borrow().get(name).cloned()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self
            .cache
            .borrow()
            .values()
            .map(|p| p.category.clone())
            .collect();
        cats.sort();
        cats.dedup();
        cats
    }

    pub fn active_preset(&self) -> Option<String> {
        self.active.borrow().as_ref().map(|a| a.name.clone())
    }

    /// True when no preset is active, the theme was switched, or the live
    /// theme config is no longer deep-equal to what applying the preset left.
    pub fn has_state_changed(&self) -> bool {
        let active = self.active.borrow();
        let Some(active) = active.as_ref() else {
            return true;
        };
        if self.store.current_theme() != active.theme {
            return true;
        }
        self.store.theme_config(&active.theme).as_ref() != Some(&active.baseline)
    }

    pub fn export_presets(&self, category: Option<&str>) -> String {
        presets_to_json(&self.cache.borrow(), category)
    }

    /// Import through the persistence layer, then refresh the cache.
    pub fn import_presets(&self, json: &str, overwrite: bool) -> usize {
        let count = self.persistence.import_presets(json, overwrite);
        if let Err(e) = self.reload() {
            log::error!("[presets] reload after import failed: {e}");
        }
        count
    }
}

fn valid_name(name: &str) -> Result<String, PresetError> {
    match name.trim() {
        "" => Err(PresetError::InvalidName),
        trimmed => Ok(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(theme: &str) -> Value {
        json!({ "name": "ignored", "theme": theme, "config": { "count": 1 } })
    }

    #[test]
    fn import_keeps_existing_names_without_overwrite() {
        let mut existing = PresetMap::new();
        let json = json!({ "A": record("snowflakes") }).to_string();
        assert_eq!(merge_imported(&mut existing, &json, false), Some(1));
        assert_eq!(existing["A"].name, "A");
        assert_eq!(existing["A"].category, DEFAULT_CATEGORY);

        let again = json!({ "A": record("underwater"), "B": record("underwater") }).to_string();
        assert_eq!(merge_imported(&mut existing, &again, false), Some(1));
        assert_eq!(existing["A"].theme, "snowflakes");
        assert_eq!(existing["B"].theme, "underwater");
    }

    #[test]
    fn import_with_overwrite_replaces_collection() {
        let mut existing = PresetMap::new();
        merge_imported(&mut existing, &json!({ "A": record("snowflakes") }).to_string(), false);
        let json = json!({ "B": record("underwater"), "bad": 3 }).to_string();
        assert_eq!(merge_imported(&mut existing, &json, true), Some(1));
        assert!(!existing.contains_key("A"));
        assert!(existing.contains_key("B"));
    }

    #[test]
    fn malformed_import_is_a_no_op() {
        let mut existing = PresetMap::new();
        merge_imported(&mut existing, &json!({ "A": record("snowflakes") }).to_string(), false);
        assert_eq!(merge_imported(&mut existing, "{not json", true), None);
        assert_eq!(merge_imported(&mut existing, "[1,2]", true), None);
        assert_eq!(existing.len(), 1);
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(valid_name("  Calm ").unwrap(), "Calm");
        assert!(matches!(valid_name("   "), Err(PresetError::InvalidName)));
    }
}
