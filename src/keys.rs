// Keyboard shortcuts, kept free of web-sys so they can be tested on the host.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    ToggleDebug,
    ToggleRunning,
    SaveState,
    NextTheme,
    ResetTheme,
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    match key {
        "d" | "D" => Some(KeyAction::ToggleDebug),
        " " => Some(KeyAction::ToggleRunning),
        "s" | "S" => Some(KeyAction::SaveState),
        "t" | "T" => Some(KeyAction::NextTheme),
        "r" | "R" => Some(KeyAction::ResetTheme),
        _ => None,
    }
}

/// The theme after `current` in `themes`, wrapping around. Unknown or empty
/// input falls back to the first theme.
pub fn next_theme<'a>(current: &str, themes: &[&'a str]) -> Option<&'a str> {
    let idx = themes.iter().position(|t| *t == current);
    match idx {
        Some(i) => themes.get((i + 1) % themes.len()).copied(),
        None => themes.first().copied(),
    }
}
