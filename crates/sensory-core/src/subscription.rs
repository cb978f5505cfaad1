//! Scope-keyed observer registry.
//!
//! A scope is either one of the named aliases (`"theme"`, `"audio"`, ...), which
//! expand to a fixed set of state paths, or a raw dot-path. `"global"` matches
//! every change. Handles are compared by pointer identity, so subscribing the
//! same `Rc` twice under one scope is a no-op.

use crate::constants::*;
use crate::value::{paths_overlap, ChangeSet};
use fnv::FnvHashMap;
use serde_json::Value;
use smallvec::{smallvec, SmallVec};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Anything that reacts to state changes: UI controller, themes, audio, debug tools.
pub trait Observer {
    fn update(&self, new_state: &Value, old_state: &Value) -> anyhow::Result<()>;
}

impl<F> Observer for F
where
    F: Fn(&Value, &Value) -> anyhow::Result<()>,
{
    fn update(&self, new_state: &Value, old_state: &Value) -> anyhow::Result<()> {
        self(new_state, old_state)
    }
}

pub type ObserverHandle = Rc<dyn Observer>;

type ScopePaths = SmallVec<[String; 4]>;

struct Registration {
    scope: String,
    handles: Vec<ObserverHandle>,
}

pub struct SubscriptionRegistry {
    // Scopes in order of first registration; handles in subscription order.
    registrations: Vec<Registration>,
    aliases: FnvHashMap<String, ScopePaths>,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        let mut aliases: FnvHashMap<String, ScopePaths> = FnvHashMap::default();
        aliases.insert(
            THEME_SCOPE.to_string(),
            smallvec!["currentTheme".to_string(), "themeConfigs".to_string()],
        );
        aliases.insert(AUDIO_SCOPE.to_string(), smallvec!["audioConfig".to_string()]);
        aliases.insert(
            UI_SCOPE.to_string(),
            smallvec![
                "currentTheme".to_string(),
                "isRunning".to_string(),
                "isFullscreen".to_string(),
                "themeConfigs".to_string(),
            ],
        );
        aliases.insert(DEBUG_SCOPE.to_string(), smallvec!["debug".to_string()]);
        Self {
            registrations: Vec::new(),
            aliases,
        }
    }

    /// Define (or redefine) a named scope as a set of state paths.
    pub fn define_scope<I, S>(&mut self, name: &str, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .insert(name.to_string(), paths.into_iter().map(Into::into).collect());
    }

    /// Register `handle` under `scope`. Returns `false` if that exact pair was
    /// already registered.
    pub fn subscribe(&mut self, handle: ObserverHandle, scope: &str) -> bool {
        match self.registrations.iter_mut().find(|r| r.scope == scope) {
            Some(reg) => {
                if reg.handles.iter().any(|h| same_handle(h, &handle)) {
                    return false;
                }
                reg.handles.push(handle);
            }
            None => self.registrations.push(Registration {
                scope: scope.to_string(),
                handles: vec![handle],
            }),
        }
        true
    }

    /// Remove exactly the `(handle, scope)` registration. Returns whether one existed.
    pub fn unsubscribe(&mut self, handle: &ObserverHandle, scope: &str) -> bool {
        let Some(reg) = self.registrations.iter_mut().find(|r| r.scope == scope) else {
            return false;
        };
        let before = reg.handles.len();
        reg.handles.retain(|h| !same_handle(h, handle));
        before != reg.handles.len()
    }

    pub fn subscriber_count(&self, scope: &str) -> usize {
        self.registrations
            .iter()
            .find(|r| r.scope == scope)
            .map_or(0, |r| r.handles.len())
    }

    /// Whether a change-set touches anything `scope` watches.
    pub fn scope_matches(&self, scope: &str, changes: &ChangeSet) -> bool {
        if scope == GLOBAL_SCOPE {
            return true;
        }
        match self.aliases.get(scope) {
            Some(paths) => paths
                .iter()
                .any(|p| changes.keys().any(|changed| paths_overlap(p, changed))),
            None => changes.keys().any(|changed| paths_overlap(scope, changed)),
        }
    }

    /// Snapshot of the handles registered under `scope`, in subscription order.
    pub fn handles(&self, scope: &str) -> Vec<ObserverHandle> {
        self.registrations
            .iter()
            .find(|r| r.scope == scope)
            .map(|r| r.handles.clone())
            .unwrap_or_default()
    }

    /// Every `(scope, handle)` pair that should hear about `changes`, in scope
    /// registration order then subscription order.
    pub fn targets(&self, changes: &ChangeSet) -> Vec<(String, ObserverHandle)> {
        self.registrations
            .iter()
            .filter(|r| !r.handles.is_empty() && self.scope_matches(&r.scope, changes))
            .flat_map(|r| r.handles.iter().map(|h| (r.scope.clone(), h.clone())))
            .collect()
    }

    /// Invoke every handle registered for `scope`. A failing handle is logged
    /// and skipped; the rest still run.
    pub fn dispatch(&self, scope: &str, new_state: &Value, old_state: &Value) {
        for handle in self.handles(scope) {
            notify(&handle, scope, new_state, old_state);
        }
    }
}

/// Call one observer, containing both returned errors and panics.
/// Returns whether the observer completed successfully.
///
/// Panics are only caught where unwinding exists. On `wasm32-unknown-unknown`
/// a panic aborts the module, so browser observers must report failure by
/// returning `Err`.
pub fn notify(handle: &ObserverHandle, scope: &str, new_state: &Value, old_state: &Value) -> bool {
    match catch_unwind(AssertUnwindSafe(|| handle.update(new_state, old_state))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::error!("[subscribers] observer on '{scope}' failed: {e:#}");
            false
        }
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("[subscribers] observer on '{scope}' panicked: {msg}");
            false
        }
    }
}

#[inline]
fn same_handle(a: &ObserverHandle, b: &ObserverHandle) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Change;
    use std::cell::Cell;

    fn changes(paths: &[&str]) -> ChangeSet {
        paths
            .iter()
            .map(|p| {
                (
                    p.to_string(),
                    Change {
                        from: None,
                        to: Some(Value::Bool(true)),
                    },
                )
            })
            .collect()
    }

    struct Counter(Cell<u32>);

    impl Observer for Counter {
        fn update(&self, _: &Value, _: &Value) -> anyhow::Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn resubscribing_is_idempotent() {
        let mut reg = SubscriptionRegistry::new();
        let h: ObserverHandle = Rc::new(Counter(Cell::new(0)));
        assert!(reg.subscribe(h.clone(), "theme"));
        assert!(!reg.subscribe(h.clone(), "theme"));
        assert!(reg.subscribe(h.clone(), "audio"));
        assert_eq!(reg.subscriber_count("theme"), 1);
        assert_eq!(reg.targets(&changes(&["themeConfigs.snowflakes.count"])).len(), 1);
    }

    #[test]
    fn unsubscribe_removes_only_that_pair() {
        let mut reg = SubscriptionRegistry::new();
        let h: ObserverHandle = Rc::new(Counter(Cell::new(0)));
        reg.subscribe(h.clone(), "theme");
        reg.subscribe(h.clone(), GLOBAL_SCOPE);
        assert!(reg.unsubscribe(&h, "theme"));
        assert!(!reg.unsubscribe(&h, "theme"));
        assert_eq!(reg.subscriber_count(GLOBAL_SCOPE), 1);
    }

    #[test]
    fn aliases_and_raw_paths_match_changes() {
        let reg = SubscriptionRegistry::new();
        let c = changes(&["audioConfig.threshold"]);
        assert!(reg.scope_matches("audio", &c));
        assert!(reg.scope_matches(GLOBAL_SCOPE, &c));
        assert!(!reg.scope_matches("theme", &c));
        assert!(reg.scope_matches("audioConfig", &c));
        assert!(!reg.scope_matches("audioConfig.enabled", &c));
    }

    #[test]
    fn dispatch_continues_after_failure() {
        let mut reg = SubscriptionRegistry::new();
        let failing: ObserverHandle =
            Rc::new(|_: &Value, _: &Value| -> anyhow::Result<()> { anyhow::bail!("boom") });
        let counter = Rc::new(Counter(Cell::new(0)));
        reg.subscribe(failing, "theme");
        reg.subscribe(counter.clone(), "theme");
        reg.dispatch("theme", &Value::Null, &Value::Null);
        assert_eq!(counter.0.get(), 1);
    }
}
