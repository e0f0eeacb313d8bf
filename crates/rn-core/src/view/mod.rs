use serde::{Serialize, Deserialize};

use crate::coords::{Bounds, LatLng};

mod emitter;
mod subscriber;

pub use emitter::ViewCommandEmitter;
pub use subscriber::ViewSubscriber;

/// Declarative camera command for the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewCommand {
    /// Animate the camera to a point
    FlyTo {
        center: LatLng,
        zoom: u8,
        duration_ms: u64,
    },
    /// Frame the given box
    FitBounds(Bounds),
}
