use async_trait::async_trait;
use serde::Deserialize;
use rn_core::{LatLng, LookupError, RouteLookup, RouteProvider};

use crate::config::EndpointConfig;
use crate::SourceError;

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
struct WireRoute {
    geometry: Geometry,
    distance: f64,
    duration: f64,
}

/// GeoJSON LineString; positions are `[lon, lat]`
#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

/// Route lookup against an OSRM-compatible service
pub struct OsrmRouter {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

impl OsrmRouter {
    /// Create a router from endpoint config
    pub fn new(config: &EndpointConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(config.http_client()?, &config.osrm_url, &config.osrm_profile))
    }

    /// Create a router sharing an existing client
    pub fn with_client(client: reqwest::Client, base_url: &str, profile: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile: profile.to_string(),
        }
    }

    /// Full-geometry route URL between two points
    pub fn route_url(&self, origin: LatLng, destination: LatLng) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, self.profile, origin.lon, origin.lat, destination.lon, destination.lat
        )
    }

    async fn fetch(&self, origin: LatLng, destination: LatLng) -> Result<RouteLookup, SourceError> {
        let response = self.client.get(self.route_url(origin, destination)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error responses still carry a JSON `code`; fall back to the status when they don't
        match parse_route(&body) {
            Err(SourceError::Json(_)) if !status.is_success() => Err(SourceError::Status(status.as_u16())),
            result => result,
        }
    }
}

#[async_trait]
impl RouteProvider for OsrmRouter {
    async fn route(&self, origin: LatLng, destination: LatLng) -> Result<RouteLookup, LookupError> {
        tracing::debug!("OSRM route {} -> {}", origin, destination);
        Ok(self.fetch(origin, destination).await?)
    }
}

/// Decode a route body, taking the first route and flipping positions to lat/lon
pub fn parse_route(body: &str) -> Result<RouteLookup, SourceError> {
    let response: RouteResponse = serde_json::from_str(body)?;

    if response.code != "Ok" {
        tracing::debug!("OSRM answered {}: {}", response.code, response.message.as_deref().unwrap_or(""));
        return Err(SourceError::NoRoute);
    }

    let route = response.routes.into_iter().next().ok_or(SourceError::NoRoute)?;
    Ok(RouteLookup {
        polyline: route.geometry.coordinates
            .into_iter()
            .map(|[lon, lat]| LatLng::new(lat, lon))
            .collect(),
        distance_m: route.distance,
        duration_s: route.duration,
    })
}
