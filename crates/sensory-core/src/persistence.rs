//! Durable storage for the state tree and the preset collection.
//!
//! Two string blobs live under a shared prefix: `<prefix>state` and
//! `<prefix>presets`. They are read and written independently so a failure on
//! one never touches the other.

use crate::constants::*;
use crate::error::{PersistenceError, StorageError};
use crate::preset::{merge_imported, presets_to_json, Preset, PresetMap};
use crate::store::StateManager;
use fnv::FnvHashMap;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// String-valued key/value medium (browser `localStorage`, memory, ...).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process storage for native hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<FnvHashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

pub struct PersistenceAdapter {
    store: Rc<StateManager>,
    storage: Box<dyn KeyValueStore>,
    prefix: String,
}

impl PersistenceAdapter {
    pub fn new(store: Rc<StateManager>, storage: impl KeyValueStore + 'static) -> Self {
        Self::with_prefix(store, storage, STORAGE_PREFIX)
    }

    pub fn with_prefix(
        store: Rc<StateManager>,
        storage: impl KeyValueStore + 'static,
        prefix: &str,
    ) -> Self {
        Self {
            store,
            storage: Box::new(storage),
            prefix: prefix.to_string(),
        }
    }

    fn key(&self, name: &str) -> String {
        storage_key(&self.prefix, name)
    }

    /// Write the current state, minus volatile fields. On failure the
    /// previously stored blob is left as it was.
    pub fn save_state(&self) -> Result<(), PersistenceError> {
        let mut state = self.store.get_state();
        strip_volatile(&mut state);
        let raw = serde_json::to_string(&state)?;
        self.storage.set(&self.key(STATE_KEY), &raw)?;
        log::debug!("[persist] saved state ({} bytes)", raw.len());
        Ok(())
    }

    /// Merge the stored state into the store. The debug flag keeps its
    /// pre-load value. On any failure the store is left untouched.
    pub fn load_state(&self) -> Result<(), PersistenceError> {
        let key = self.key(STATE_KEY);
        let raw = self
            .storage
            .get(&key)?
            .ok_or_else(|| PersistenceError::NotFound(key.clone()))?;
        let mut parsed: Value =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            })?;
        if !parsed.is_object() {
            return Err(PersistenceError::Corrupt {
                key,
                reason: "expected a JSON object".to_string(),
            });
        }
        strip_volatile(&mut parsed);

        let debug = self.store.is_debug();
        self.store.update_state(&parsed, "loadState");
        self.store.set_debug_mode(debug);
        log::info!("[persist] restored state from '{key}'");
        Ok(())
    }

    pub fn clear_state(&self) -> Result<(), PersistenceError> {
        self.storage.remove(&self.key(STATE_KEY))?;
        Ok(())
    }

    /// The stored collection; an absent blob is an empty collection.
    pub fn get_presets(&self) -> Result<PresetMap, PersistenceError> {
        let key = self.key(PRESETS_KEY);
        match self.storage.get(&key)? {
            None => Ok(PresetMap::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupt {
                key,
                reason: e.to_string(),
            }),
        }
    }

    pub fn get_preset(&self, name: &str) -> Option<Preset> {
        self.get_presets()
            .map_err(|e| log::warn!("[persist] presets unreadable: {e}"))
            .ok()?
            .remove(name)
    }

    /// Replace the whole stored collection.
    pub fn write_presets(&self, presets: &PresetMap) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(presets)?;
        self.storage.set(&self.key(PRESETS_KEY), &raw)?;
        Ok(())
    }

    /// Insert or replace one preset by name.
    pub fn save_preset(&self, preset: &Preset) -> Result<(), PersistenceError> {
        let mut presets = self.presets_for_write();
        presets.insert(preset.name.clone(), preset.clone());
        self.write_presets(&presets)
    }

    /// Returns `Ok(false)` when no preset has that name.
    pub fn delete_preset(&self, name: &str) -> Result<bool, PersistenceError> {
        let mut presets = self.get_presets()?;
        if presets.remove(name).is_none() {
            return Ok(false);
        }
        self.write_presets(&presets)?;
        Ok(true)
    }

    pub fn export_presets(&self, category: Option<&str>) -> Result<String, PersistenceError> {
        Ok(presets_to_json(&self.get_presets()?, category))
    }

    /// Import a JSON object of presets. See [`merge_imported`] for precedence.
    /// Returns the number of presets written; malformed input imports nothing.
    pub fn import_presets(&self, json: &str, overwrite: bool) -> usize {
        let mut presets = self.presets_for_write();
        let Some(count) = merge_imported(&mut presets, json, overwrite) else {
            return 0;
        };
        if count == 0 && !overwrite {
            return 0;
        }
        match self.write_presets(&presets) {
            Ok(()) => count,
            Err(e) => {
                log::error!("[persist] preset import not saved: {e}");
                0
            }
        }
    }

    // A corrupt collection cannot be recovered, so writers start over.
    fn presets_for_write(&self) -> PresetMap {
        self.get_presets().unwrap_or_else(|e| {
            log::warn!("[persist] discarding unreadable presets: {e}");
            PresetMap::new()
        })
    }
}

fn strip_volatile(state: &mut Value) {
    if let Value::Object(map) = state {
        for field in VOLATILE_FIELDS {
            map.remove(*field);
        }
    }
}
