//! The single authoritative state tree and its read-merge-notify cycle.
//!
//! `StateManager` is built once by the entry point and shared as
//! `Rc<StateManager>`. All mutation goes through [`StateManager::update_state`],
//! which merges, diffs, optionally records history, then notifies matching
//! observers synchronously before returning. Observers may call back into the
//! store: a nested update runs its full cycle (depth first) before the outer
//! dispatch resumes with its remaining observers.

use crate::constants::*;
use crate::error::StateError;
use crate::history::{now_ms, HistoryEntry, HistoryLog};
use crate::state::{builtin_theme_defaults, ApplicationState, ThemeId};
use crate::subscription::{notify, ObserverHandle, SubscriptionRegistry};
use crate::value::{deep_merge, diff, lookup, ChangeSet};
use fnv::FnvHashMap;
use instant::Instant;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::cell::{Cell, RefCell};

pub struct StateManager {
    state: RefCell<Value>,
    registry: RefCell<SubscriptionRegistry>,
    history: RefCell<HistoryLog>,
    theme_defaults: RefCell<FnvHashMap<ThemeId, Value>>,
    depth: Cell<usize>,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    pub fn new() -> Self {
        Self::with_initial(ApplicationState::default().to_value())
    }

    /// Start from an explicit tree. A non-object falls back to the defaults.
    pub fn with_initial(initial: Value) -> Self {
        let state = if initial.is_object() {
            initial
        } else {
            log::warn!("[state] initial state is not an object; using defaults");
            ApplicationState::default().to_value()
        };
        let theme_defaults = builtin_theme_defaults()
            .into_iter()
            .map(|(id, config)| (id.to_string(), config))
            .collect();
        Self {
            state: RefCell::new(state),
            registry: RefCell::new(SubscriptionRegistry::new()),
            history: RefCell::new(HistoryLog::new(HISTORY_CAPACITY)),
            theme_defaults: RefCell::new(theme_defaults),
            depth: Cell::new(0),
        }
    }

    /// Snapshot of the whole tree. Mutating it does not affect the store.
    pub fn get_state(&self) -> Value {
        self.state.borrow().clone()
    }

    /// Resolve a dot-path; `None` when any segment is absent.
    pub fn get_state_section(&self, dot_path: &str) -> Option<Value> {
        lookup(&self.state.borrow(), dot_path).cloned()
    }

    /// Resolve a dot-path and deserialize it into `T`.
    pub fn section_as<T: DeserializeOwned>(&self, dot_path: &str) -> Option<T> {
        let section = self.get_state_section(dot_path)?;
        serde_json::from_value(section)
            .map_err(|e| log::warn!("[state] section '{dot_path}' has unexpected shape: {e}"))
            .ok()
    }

    pub fn current_theme(&self) -> ThemeId {
        self.state.borrow()["currentTheme"]
            .as_str()
            .unwrap_or(SNOWFLAKES)
            .to_string()
    }

    /// A theme's config subtree, addressed by key so ids may contain dots.
    pub fn theme_config(&self, theme_id: &str) -> Option<Value> {
        self.state.borrow()["themeConfigs"].get(theme_id).cloned()
    }

    pub fn is_debug(&self) -> bool {
        self.state.borrow()["debug"].as_bool().unwrap_or(false)
    }

    /// Deep-merge `partial` into the state and notify observers.
    ///
    /// Returns the changed leaf paths. A non-object partial changes nothing.
    /// When nothing changed no observer is called and no history is written.
    pub fn update_state(&self, partial: &Value, source: &str) -> ChangeSet {
        let started = Instant::now();
        let (old_state, new_state, changes) = {
            let mut state = self.state.borrow_mut();
            let old_state = state.clone();
            if !deep_merge(&mut state, partial) {
                log::warn!("[state] {source}: ignoring non-object update");
                return ChangeSet::new();
            }
            let changes = diff(&old_state, &state);
            (old_state, state.clone(), changes)
        };
        let duration = started.elapsed().as_secs_f64() * 1000.0;

        if changes.is_empty() {
            log::debug!("[state] {source}: no changes");
            return changes;
        }
        log::debug!("[state] {source}: {} change(s)", changes.len());

        if new_state["debug"].as_bool().unwrap_or(false) {
            self.history.borrow_mut().push(HistoryEntry {
                timestamp: now_ms(),
                source: source.to_string(),
                duration,
                changes: changes.clone(),
                previous_state: old_state.clone(),
                new_state: new_state.clone(),
            });
        }

        let depth = self.depth.get();
        if depth >= MAX_DISPATCH_DEPTH {
            log::error!(
                "[state] {source}: update nested {depth} levels deep; observers not notified"
            );
            return changes;
        }

        // Snapshot targets so observers may (un)subscribe while being notified.
        let targets = self.registry.borrow().targets(&changes);
        self.depth.set(depth + 1);
        for (scope, handle) in &targets {
            notify(handle, scope, &new_state, &old_state);
        }
        self.depth.set(depth);
        changes
    }

    pub fn set_debug_mode(&self, enabled: bool) {
        self.update_state(&json!({ "debug": enabled }), "setDebugMode");
    }

    /// Set one parameter of one theme's config.
    pub fn set_theme_param(&self, key: &str, value: Value, theme_id: &str) -> ChangeSet {
        let mut config = Map::new();
        config.insert(key.to_string(), value);
        let mut configs = Map::new();
        configs.insert(theme_id.to_string(), Value::Object(config));
        self.update_state(
            &json!({ "themeConfigs": Value::Object(configs) }),
            &format!("setThemeParam:{theme_id}.{key}"),
        )
    }

    /// Switch the active theme. Its config must already be present.
    pub fn set_theme(&self, theme_id: &str) -> Result<(), StateError> {
        if self.theme_config(theme_id).is_none() {
            return Err(StateError::UnknownTheme(theme_id.to_string()));
        }
        self.update_state(&json!({ "currentTheme": theme_id }), "setTheme");
        Ok(())
    }

    /// Remember `defaults` for a theme and drop them into `themeConfigs` if
    /// the theme has no config yet. Returns whether a config was inserted.
    pub fn register_theme(&self, theme_id: &str, defaults: Value) -> bool {
        self.theme_defaults
            .borrow_mut()
            .insert(theme_id.to_string(), defaults.clone());
        if self.theme_config(theme_id).is_some() {
            return false;
        }
        let mut configs = Map::new();
        configs.insert(theme_id.to_string(), defaults);
        self.update_state(
            &json!({ "themeConfigs": Value::Object(configs) }),
            &format!("registerTheme:{theme_id}"),
        );
        true
    }

    /// Re-apply a theme's registered defaults.
    pub fn reset_theme(&self, theme_id: &str) -> Result<ChangeSet, StateError> {
        let defaults = self
            .theme_defaults
            .borrow()
            .get(theme_id)
            .cloned()
            .ok_or_else(|| StateError::UnknownTheme(theme_id.to_string()))?;
        let mut configs = Map::new();
        configs.insert(theme_id.to_string(), defaults);
        Ok(self.update_state(
            &json!({ "themeConfigs": Value::Object(configs) }),
            &format!("resetTheme:{theme_id}"),
        ))
    }

    pub fn subscribe(&self, handle: ObserverHandle, scope: &str) -> bool {
        self.registry.borrow_mut().subscribe(handle, scope)
    }

    pub fn unsubscribe(&self, handle: &ObserverHandle, scope: &str) -> bool {
        self.registry.borrow_mut().unsubscribe(handle, scope)
    }

    pub fn define_scope<I, S>(&self, name: &str, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.borrow_mut().define_scope(name, paths);
    }

    pub fn subscriber_count(&self, scope: &str) -> usize {
        self.registry.borrow().subscriber_count(scope)
    }

    /// Recorded changes, oldest first. Only populated while debug is on.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.borrow().entries().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_object_update_is_a_no_op() {
        let store = StateManager::new();
        let before = store.get_state();
        assert!(store.update_state(&json!(42), "test").is_empty());
        assert_eq!(store.get_state(), before);
    }

    #[test]
    fn returned_snapshot_is_detached() {
        let store = StateManager::new();
        let mut snap = store.get_state();
        snap["isRunning"] = json!(false);
        assert_eq!(store.get_state()["isRunning"], true);
    }

    #[test]
    fn with_initial_rejects_non_objects() {
        let store = StateManager::with_initial(json!([1, 2]));
        assert_eq!(store.current_theme(), SNOWFLAKES);
    }

    #[test]
    fn history_only_while_debug() {
        let store = StateManager::new();
        store.set_theme_param("count", json!(10), SNOWFLAKES);
        assert!(store.history().is_empty());
        store.set_debug_mode(true);
        store.set_theme_param("count", json!(20), SNOWFLAKES);
        let sources: Vec<String> = store.history().into_iter().map(|e| e.source).collect();
        assert_eq!(sources, ["setDebugMode", "setThemeParam:snowflakes.count"]);
        store.clear_history();
        assert!(store.history().is_empty());
    }

    #[test]
    fn history_is_capped() {
        let store = StateManager::new();
        store.set_debug_mode(true);
        for i in 0..(HISTORY_CAPACITY as u32 + 10) {
            store.set_theme_param("count", json!(i + 1000), SNOWFLAKES);
        }
        let history = store.history();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(
            history.last().unwrap().changes["themeConfigs.snowflakes.count"].to,
            Some(json!(HISTORY_CAPACITY as u32 + 1009))
        );
    }
}
