// Store, persistence and default-scene tuning constants shared by every front end.

// Theme identifiers (keys of `themeConfigs`)
pub const SNOWFLAKES: &str = "snowflakes";
pub const UNDERWATER: &str = "underwater";

// Subscription scopes
pub const GLOBAL_SCOPE: &str = "global";
pub const THEME_SCOPE: &str = "theme";
pub const AUDIO_SCOPE: &str = "audio";
pub const UI_SCOPE: &str = "ui";
pub const DEBUG_SCOPE: &str = "debug";

// Debug history ring size (oldest evicted first)
pub const HISTORY_CAPACITY: usize = 50;

// Nested update_state calls deeper than this merge but skip dispatch
pub const MAX_DISPATCH_DEPTH: usize = 16;

// Persistence namespace
pub const STORAGE_PREFIX: &str = "sensory_";
pub const STATE_KEY: &str = "state";
pub const PRESETS_KEY: &str = "presets";

// Fields never written to the persisted state blob
pub const VOLATILE_FIELDS: &[&str] = &["debug"];

// Default preset category
pub const DEFAULT_CATEGORY: &str = "default";

// Default snowflake scene
pub const DEFAULT_SNOW_COUNT: u32 = 200;
pub const DEFAULT_SNOW_SIZE: f32 = 3.0;
pub const DEFAULT_SNOW_SPEED: f32 = 1.0;
pub const DEFAULT_SNOW_WIND: f32 = 0.0;
pub const DEFAULT_SNOW_WOBBLE: f32 = 0.5;
pub const DEFAULT_SNOW_COLOR: &str = "#ffffff";
pub const DEFAULT_SNOW_BACKGROUND: &str = "#0b1026";

// Default underwater scene
pub const DEFAULT_BUBBLE_COUNT: u32 = 60;
pub const DEFAULT_FISH_COUNT: u32 = 8;
pub const DEFAULT_BUBBLE_SIZE: f32 = 6.0;
pub const DEFAULT_BUBBLE_SPEED: f32 = 1.0;
pub const DEFAULT_CURRENT: f32 = 0.2; // horizontal drift
pub const DEFAULT_BUBBLE_WOBBLE: f32 = 0.6;
pub const DEFAULT_BUBBLE_COLOR: &str = "#9fe3ff";
pub const DEFAULT_FISH_COLOR: &str = "#ff9f43";
pub const DEFAULT_WATER_COLOR: &str = "#04324d";

// Microphone reaction
pub const DEFAULT_AUDIO_THRESHOLD: f32 = 0.15; // normalized volume 0..1
pub const DEFAULT_AUDIO_SENSITIVITY: f32 = 1.0;
pub const DEFAULT_AUDIO_COOLDOWN_MS: u32 = 500;

/// Full storage key for `name` under `prefix`, e.g. `sensory_state`.
#[inline]
pub fn storage_key(prefix: &str, name: &str) -> String {
    format!("{prefix}{name}")
}
