// Host-side tests for pure keyboard functions.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod keys {
    include!("../src/keys.rs");
}

use keys::*;

#[test]
fn shortcut_keys_map_to_actions() {
    assert_eq!(action_for_key("d"), Some(KeyAction::ToggleDebug));
    assert_eq!(action_for_key("D"), Some(KeyAction::ToggleDebug));
    assert_eq!(action_for_key(" "), Some(KeyAction::ToggleRunning));
    assert_eq!(action_for_key("s"), Some(KeyAction::SaveState));
    assert_eq!(action_for_key("T"), Some(KeyAction::NextTheme));
    assert_eq!(action_for_key("r"), Some(KeyAction::ResetTheme));
}

#[test]
fn other_keys_are_ignored() {
    for key in ["x", "Enter", "Escape", "1", "", "dd"] {
        assert_eq!(action_for_key(key), None, "key {key:?} should be ignored");
    }
}

#[test]
fn theme_cycle_wraps() {
    let themes = ["snowflakes", "underwater", "aurora"];
    assert_eq!(next_theme("snowflakes", &themes), Some("underwater"));
    assert_eq!(next_theme("aurora", &themes), Some("snowflakes"));
    assert_eq!(next_theme("unknown", &themes), Some("snowflakes"));
    assert_eq!(next_theme("snowflakes", &[]), None);
    assert_eq!(next_theme("solo", &["solo"]), Some("solo"));
}
