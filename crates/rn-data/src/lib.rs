//! Collaborator implementations for the navigation core
//!
//! HTTP geocoding and routing against Nominatim/OSRM-compatible services,
//! a scripted position source, and the [`PositionStream`] that feeds
//! readings into the navigator.

pub mod config;
pub mod sources;
pub mod stream;

use thiserror::Error;
use rn_core::LookupError;

// Re-exports
pub use config::EndpointConfig;
pub use sources::{NominatimGeocoder, OsrmRouter, ScriptStep, ScriptedPositionSource};
pub use stream::PositionStream;

/// Errors that can occur talking to an external service
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service responded with HTTP {0}")]
    Status(u16),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),

    #[error("service error: {0}")]
    Service(String),

    #[error("no route found")]
    NoRoute,
}

impl From<SourceError> for LookupError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::Http(e) if e.is_decode() => LookupError::Decode(e.to_string()),
            SourceError::Http(e) => match e.status() {
                Some(status) => LookupError::Status(status.as_u16()),
                None => LookupError::Network(e.to_string()),
            },
            SourceError::Status(code) => LookupError::Status(code),
            SourceError::NoRoute => LookupError::NoRoute,
            other @ (SourceError::Json(_) | SourceError::InvalidCoordinate(_) | SourceError::Service(_)) => {
                LookupError::Decode(other.to_string())
            }
        }
    }
}
