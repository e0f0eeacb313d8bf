//! External capabilities the core consumes
//!
//! Implementations live in `rn-data`; tests use in-memory fakes.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::coords::LatLng;
use crate::error::{LookupError, PositionError};
use crate::position::{Position, PositionOptions};
use crate::route::RouteLookup;
use crate::search::Suggestion;

/// Forward and reverse geocoding
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates for free text, in server order
    async fn search(&self, text: &str, limit: usize) -> Result<Vec<Suggestion>, LookupError>;

    /// Human-readable label for a coordinate
    async fn reverse(&self, coords: LatLng) -> Result<String, LookupError>;
}

/// Route lookup between two points, always with full geometry
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, origin: LatLng, destination: LatLng) -> Result<RouteLookup, LookupError>;
}

/// One update from a position source
pub type PositionReading = Result<Position, PositionError>;

/// Continuous device-location capability
pub trait PositionSource: Send + Sync {
    /// Start delivering readings into `sink` until the handle is cancelled
    fn watch(&self, options: PositionOptions, sink: mpsc::UnboundedSender<PositionReading>) -> WatchHandle;
}

/// Unsubscribes from a position source when cancelled or dropped
pub struct WatchHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchHandle {
    /// Wrap the source-specific unsubscribe action
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribe; later calls do nothing
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle").field("active", &self.is_active()).finish()
    }
}
