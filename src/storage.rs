use sensory_core::{KeyValueStore, PersistenceAdapter, StorageError};
use serde_json::Value;
use std::rc::{Rc, Weak};
use web_sys as web;

/// `window.localStorage`. Private browsing or disabled storage leaves it
/// unavailable; every call then fails without touching anything.
pub struct LocalStorage {
    storage: Option<web::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web::window().and_then(|w| match w.local_storage() {
            Ok(s) => s,
            Err(e) => {
                log::warn!("[storage] localStorage unavailable: {e:?}");
                None
            }
        });
        Self { storage }
    }

    fn inner(&self) -> Result<&web::Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner()?
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }
}

/// Saves the state after every change.
pub struct AutoSave {
    persistence: Weak<PersistenceAdapter>,
}

impl AutoSave {
    pub fn new(persistence: &Rc<PersistenceAdapter>) -> Self {
        Self {
            persistence: Rc::downgrade(persistence),
        }
    }
}

impl sensory_core::Observer for AutoSave {
    fn update(&self, _new_state: &Value, _old_state: &Value) -> anyhow::Result<()> {
        if let Some(persistence) = self.persistence.upgrade() {
            persistence.save_state()?;
        }
        Ok(())
    }
}
