//! Endpoint configuration for the HTTP collaborators

use std::time::Duration;
use serde::{Serialize, Deserialize};

/// Where and how to reach the geocoding and routing services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of a Nominatim-compatible geocoder
    pub nominatim_url: String,

    /// Base URL of an OSRM-compatible router
    pub osrm_url: String,

    /// OSRM routing profile
    pub osrm_profile: String,

    /// User agent sent with every request (public Nominatim requires one)
    pub user_agent: String,

    /// TCP connect timeout
    pub connect_timeout_ms: u64,
}

impl EndpointConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Build the shared HTTP client for these endpoints
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .connect_timeout(self.connect_timeout())
            .build()
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            osrm_url: "https://router.project-osrm.org".to_string(),
            osrm_profile: "driving".to_string(),
            user_agent: concat!("ridenav/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_endpoint_config() {
        let config: EndpointConfig = serde_json::from_str(r#"{ "osrm_url": "http://localhost:5000" }"#).unwrap();

        assert_eq!(config.osrm_url, "http://localhost:5000");
        assert_eq!(config.osrm_profile, "driving");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }
}
