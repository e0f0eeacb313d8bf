//! Application configuration file

use std::path::Path;
use serde::{Serialize, Deserialize};
use rn_core::{ConfigError, LatLng, NavigatorConfig};
use rn_data::EndpointConfig;

/// Everything the binary reads from its JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub navigator: NavigatorConfig,
    pub endpoints: EndpointConfig,
    pub demo: DemoConfig,
}

/// The scripted ride the binary plays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Destination text typed into the search box
    pub query: String,

    /// Positions replayed by the scripted source
    pub path: Vec<LatLng>,

    /// Time between scripted positions
    pub tick_ms: u64,

    /// How long to wait for suggestions and routes before giving up
    pub lookup_wait_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            query: "Eiffel Tower".to_string(),
            path: vec![
                LatLng::new(48.85300, 2.34990),
                LatLng::new(48.85420, 2.34470),
                LatLng::new(48.85580, 2.33860),
                LatLng::new(48.85720, 2.33150),
                LatLng::new(48.85800, 2.32300),
            ],
            tick_ms: 3_000,
            lookup_wait_ms: 10_000,
        }
    }
}

impl AppConfig {
    /// Load the config from a JSON file; missing sections take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_default_independently() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "navigator": { "control": { "hide_after_ms": 2000 } }, "demo": { "query": "Louvre" } }"#,
        ).unwrap();

        assert_eq!(config.navigator.control.hide_after_ms, 2_000);
        assert_eq!(config.navigator.search.debounce_ms, 500);
        assert_eq!(config.endpoints.osrm_profile, "driving");
        assert_eq!(config.demo.query, "Louvre");
        assert_eq!(config.demo.path.len(), 5);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AppConfig::from_json_file("/nonexistent/ridenav.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
