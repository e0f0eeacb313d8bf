//! Navigator configuration
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides.

use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::error::ConfigError;
use crate::position::PositionOptions;
use crate::state::MapStyle;

/// Top-level configuration for the navigation core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Suggestion search settings
    pub search: SearchConfig,

    /// Options passed to the position source
    pub position: PositionOptions,

    /// Floating recenter control settings
    pub control: ControlConfig,

    /// Camera moves emitted to the renderer
    pub camera: CameraConfig,

    /// Initial tile style
    pub map_style: MapStyle,
}

impl NavigatorConfig {
    /// Load a config from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a config from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Suggestion search settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a lookup is issued
    pub debounce_ms: u64,

    /// Maximum number of suggestions kept
    pub limit: usize,
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            limit: 5,
        }
    }
}

/// Floating control settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// How long the control stays visible after the last interaction
    pub hide_after_ms: u64,

    /// Screen offset of the control before any drag
    pub initial_offset: (f32, f32),
}

impl ControlConfig {
    pub fn hide_after(&self) -> Duration {
        Duration::from_millis(self.hide_after_ms)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            hide_after_ms: 5_000,
            initial_offset: (20.0, 20.0),
        }
    }
}

/// Camera move settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Zoom level for fly-to moves
    pub zoom: u8,

    /// Duration of the fly-to on a new fix or destination
    pub fly_duration_ms: u64,

    /// Duration of the fly-to when the recenter control is activated
    pub recenter_duration_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: 16,
            fly_duration_ms: 2_500,
            recenter_duration_ms: 1_800,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NavigatorConfig::default();
        assert_eq!(config.search.debounce(), Duration::from_millis(500));
        assert_eq!(config.search.limit, 5);
        assert_eq!(config.control.hide_after(), Duration::from_secs(5));
        assert_eq!(config.position.timeout_ms, 5_000);
        assert!(config.position.high_accuracy);
        assert_eq!(config.camera.zoom, 16);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = NavigatorConfig::from_json_str(
            r#"{ "search": { "debounce_ms": 250 }, "map_style": "satellite" }"#,
        ).unwrap();

        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.search.limit, 5);
        assert_eq!(config.map_style, MapStyle::Satellite);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            NavigatorConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
