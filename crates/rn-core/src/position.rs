use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::coords::LatLng;

/// A timestamped reading from the continuous location source
///
/// Readings are never mutated; each new one supersedes the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coords: LatLng,
    pub timestamp: DateTime<Utc>,
    /// Horizontal accuracy in meters, when the source reports one
    pub accuracy_m: Option<f64>,
}

impl Position {
    /// Create a position stamped with the current wall-clock time
    pub fn now(coords: LatLng) -> Self {
        Self {
            coords,
            timestamp: Utc::now(),
            accuracy_m: None,
        }
    }
}

/// Options handed to the position source when subscribing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOptions {
    /// Ask for the most precise fix the device can provide
    pub high_accuracy: bool,

    /// How long to wait for a fix before reporting a timeout
    pub timeout_ms: u64,

    /// Maximum age of a cached fix the source may return (0 = always fresh)
    pub max_age_ms: u64,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 5_000,
            max_age_ms: 0,
        }
    }
}
