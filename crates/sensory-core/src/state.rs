//! Typed defaults for the application state tree.
//!
//! The store itself works on an untyped JSON tree so consumers can hang extra
//! fields anywhere; these structs only describe the documented shape and the
//! values a fresh store starts from. Consumers may deserialize a section back
//! into them with `StateManager::section_as`.

use crate::constants::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable identifier of a visual theme, used as a key of `themeConfigs`.
pub type ThemeId = String;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnowflakesConfig {
    pub count: u32,
    pub size: f32,
    pub speed: f32,
    pub wind: f32,
    pub wobble: f32,
    pub color: String,
    pub background_color: String,
}

impl Default for SnowflakesConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_SNOW_COUNT,
            size: DEFAULT_SNOW_SIZE,
            speed: DEFAULT_SNOW_SPEED,
            wind: DEFAULT_SNOW_WIND,
            wobble: DEFAULT_SNOW_WOBBLE,
            color: DEFAULT_SNOW_COLOR.to_string(),
            background_color: DEFAULT_SNOW_BACKGROUND.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderwaterConfig {
    pub bubble_count: u32,
    pub fish_count: u32,
    pub bubble_size: f32,
    pub speed: f32,
    pub current: f32,
    pub wobble: f32,
    pub bubble_color: String,
    pub fish_color: String,
    pub water_color: String,
}

impl Default for UnderwaterConfig {
    fn default() -> Self {
        Self {
            bubble_count: DEFAULT_BUBBLE_COUNT,
            fish_count: DEFAULT_FISH_COUNT,
            bubble_size: DEFAULT_BUBBLE_SIZE,
            speed: DEFAULT_BUBBLE_SPEED,
            current: DEFAULT_CURRENT,
            wobble: DEFAULT_BUBBLE_WOBBLE,
            bubble_color: DEFAULT_BUBBLE_COLOR.to_string(),
            fish_color: DEFAULT_FISH_COLOR.to_string(),
            water_color: DEFAULT_WATER_COLOR.to_string(),
        }
    }
}

/// Microphone reaction settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub enabled: bool,
    pub threshold: f32,
    pub sensitivity: f32,
    /// Minimum milliseconds between two volume-threshold events.
    pub cooldown: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_AUDIO_THRESHOLD,
            sensitivity: DEFAULT_AUDIO_SENSITIVITY,
            cooldown: DEFAULT_AUDIO_COOLDOWN_MS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub current_theme: ThemeId,
    pub is_running: bool,
    pub is_fullscreen: bool,
    pub debug: bool,
    pub theme_configs: Map<String, Value>,
    pub audio_config: AudioConfig,
}

impl Default for ApplicationState {
    fn default() -> Self {
        let mut theme_configs = Map::new();
        for (id, config) in builtin_theme_defaults() {
            theme_configs.insert(id.to_string(), config);
        }
        Self {
            current_theme: SNOWFLAKES.to_string(),
            is_running: true,
            is_fullscreen: false,
            debug: false,
            theme_configs,
            audio_config: AudioConfig::default(),
        }
    }
}

impl ApplicationState {
    /// The state as the JSON tree the store operates on.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            log::error!("[state] default state failed to serialize: {e}");
            Value::Object(Map::new())
        })
    }
}

/// Default configs for the themes that ship with the toy.
pub fn builtin_theme_defaults() -> Vec<(&'static str, Value)> {
    vec![
        (SNOWFLAKES, config_value(&SnowflakesConfig::default())),
        (UNDERWATER, config_value(&UnderwaterConfig::default())),
    ]
}

/// Serialize a typed config into a theme config subtree.
pub fn config_value<T: Serialize>(config: &T) -> Value {
    serde_json::to_value(config).unwrap_or_else(|e| {
        log::error!("[state] theme config failed to serialize: {e}");
        Value::Object(Map::new())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tree_has_documented_fields() {
        let v = ApplicationState::default().to_value();
        assert_eq!(v["currentTheme"], SNOWFLAKES);
        assert_eq!(v["isRunning"], true);
        assert_eq!(v["isFullscreen"], false);
        assert_eq!(v["debug"], false);
        assert_eq!(v["themeConfigs"]["snowflakes"]["count"], 200);
        assert!(v["themeConfigs"]["underwater"].is_object());
        assert_eq!(v["audioConfig"]["cooldown"], 500);
    }

    #[test]
    fn typed_configs_round_trip_through_json() {
        let v = config_value(&UnderwaterConfig::default());
        assert_eq!(v["bubbleColor"], DEFAULT_BUBBLE_COLOR);
        let back: UnderwaterConfig = serde_json::from_value(v).unwrap();
        assert_eq!(back, UnderwaterConfig::default());
    }
}
