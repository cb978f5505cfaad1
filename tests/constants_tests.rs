// Host-side tests for front-end constants and their relationship to the core.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;
use sensory_core::{ApplicationState, Change, ChangeSet, SubscriptionRegistry};

#[test]
fn controls_scope_covers_state_roots() {
    let state = ApplicationState::default().to_value();
    for path in CONTROLS_SCOPE_PATHS {
        assert!(state.get(path).is_some(), "missing root field {path}");
    }
}

#[test]
fn controls_scope_hears_audio_but_not_debug() {
    let mut reg = SubscriptionRegistry::new();
    reg.define_scope(CONTROLS_SCOPE, CONTROLS_SCOPE_PATHS);
    let change = |path: &str| -> ChangeSet {
        [(
            path.to_string(),
            Change {
                from: None,
                to: Some(serde_json::Value::Bool(true)),
            },
        )]
        .into_iter()
        .collect()
    };
    assert!(reg.scope_matches(CONTROLS_SCOPE, &change("audioConfig.enabled")));
    assert!(reg.scope_matches(CONTROLS_SCOPE, &change("themeConfigs.underwater.speed")));
    assert!(!reg.scope_matches(CONTROLS_SCOPE, &change("debug")));
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn element_ids_are_distinct() {
    let ids = [
        THEME_SELECT_ID,
        RESET_THEME_ID,
        PRESET_NAME_ID,
        PRESET_CATEGORY_ID,
        PRESET_SELECT_ID,
        PRESET_SAVE_ID,
        PRESET_APPLY_ID,
        PRESET_DELETE_ID,
        PRESET_STATUS_ID,
        DEBUG_PANEL_ID,
    ];
    let mut sorted = ids.to_vec();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
    assert!(DEBUG_HISTORY_ROWS > 0);
    assert!(DEBUG_HISTORY_ROWS <= sensory_core::HISTORY_CAPACITY);
}
