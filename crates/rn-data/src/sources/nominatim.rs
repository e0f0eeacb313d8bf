use async_trait::async_trait;
use serde::Deserialize;
use rn_core::{Geocoder, LatLng, LookupError, Suggestion};

use crate::config::EndpointConfig;
use crate::SourceError;

/// One entry of a `/search` response
#[derive(Debug, Deserialize)]
struct Place {
    place_id: serde_json::Value,
    display_name: String,
    lat: String,
    lon: String,
}

/// A `/reverse` response; the service reports misses in-band
#[derive(Debug, Deserialize)]
struct ReversePlace {
    display_name: Option<String>,
    error: Option<String>,
}

/// Forward and reverse geocoding against a Nominatim-compatible service
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Create a geocoder from endpoint config
    pub fn new(config: &EndpointConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(config.http_client()?, &config.nominatim_url))
    }

    /// Create a geocoder sharing an existing client
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_search(&self, text: &str, limit: usize) -> Result<Vec<Suggestion>, SourceError> {
        let limit = limit.to_string();
        let response = self.client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "json"), ("q", text), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        parse_search(&response.text().await?)
    }

    async fn fetch_reverse(&self, coords: LatLng) -> Result<String, SourceError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        let response = self.client
            .get(format!("{}/reverse", self.base_url))
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        parse_reverse(&response.text().await?)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, text: &str, limit: usize) -> Result<Vec<Suggestion>, LookupError> {
        tracing::debug!("Nominatim search '{}' (limit {})", text, limit);
        Ok(self.fetch_search(text, limit).await?)
    }

    async fn reverse(&self, coords: LatLng) -> Result<String, LookupError> {
        tracing::debug!("Nominatim reverse {}", coords);
        Ok(self.fetch_reverse(coords).await?)
    }
}

/// Decode a `/search` body into suggestions, preserving server order
pub fn parse_search(body: &str) -> Result<Vec<Suggestion>, SourceError> {
    let places: Vec<Place> = serde_json::from_str(body)?;

    places
        .into_iter()
        .map(|place| {
            let id = match place.place_id {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            Ok(Suggestion {
                id,
                label: place.display_name,
                coords: LatLng::new(parse_degrees(&place.lat)?, parse_degrees(&place.lon)?),
            })
        })
        .collect()
}

/// Decode a `/reverse` body into a display label
pub fn parse_reverse(body: &str) -> Result<String, SourceError> {
    let place: ReversePlace = serde_json::from_str(body)?;

    match (place.display_name, place.error) {
        (Some(label), _) => Ok(label),
        (None, Some(error)) => Err(SourceError::Service(error)),
        (None, None) => Err(SourceError::Service("response has no display_name".to_string())),
    }
}

fn parse_degrees(text: &str) -> Result<f64, SourceError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| SourceError::InvalidCoordinate(text.to_string()))
}
