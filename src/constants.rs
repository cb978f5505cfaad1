// Element ids and selectors the host page provides

pub const THEME_SELECT_ID: &str = "theme-select";
pub const RESET_THEME_ID: &str = "reset-theme";

// Presets panel
pub const PRESET_NAME_ID: &str = "preset-name";
pub const PRESET_CATEGORY_ID: &str = "preset-category";
pub const PRESET_SELECT_ID: &str = "preset-select";
pub const PRESET_SAVE_ID: &str = "preset-save";
pub const PRESET_APPLY_ID: &str = "preset-apply";
pub const PRESET_DELETE_ID: &str = "preset-delete";
pub const PRESET_STATUS_ID: &str = "preset-status";

// Debug inspector
pub const DEBUG_PANEL_ID: &str = "debug-panel";
pub const DEBUG_HISTORY_ROWS: usize = 12;

// Controls: `data-param` edits the active theme's config, `data-path` any state path.
// `data-theme` limits a control to one theme.
pub const PARAM_SELECTOR: &str = "[data-param]";
pub const PATH_SELECTOR: &str = "[data-path]";

// Scope covering everything the controls display
pub const CONTROLS_SCOPE: &str = "controls";
pub const CONTROLS_SCOPE_PATHS: [&str; 4] =
    ["currentTheme", "isRunning", "themeConfigs", "audioConfig"];
