//! View command emitter implementation

use std::sync::{Arc, Weak};
use parking_lot::RwLock;

use super::{ViewCommand, ViewSubscriber};
use crate::config::CameraConfig;
use crate::position::Position;
use crate::ride::Destination;
use crate::route::Route;
use crate::state::MapSnapshot;

/// Translates core state changes into camera commands
pub struct ViewCommandEmitter {
    camera: CameraConfig,
    centered_on_first_fix: bool,
    subscribers: Arc<RwLock<Vec<Weak<dyn ViewSubscriber>>>>,
}

impl ViewCommandEmitter {
    /// Create an emitter with no subscribers
    pub fn new(camera: CameraConfig) -> Self {
        Self {
            camera,
            centered_on_first_fix: false,
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: Arc<dyn ViewSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    /// A route became the displayed route: frame all of it
    pub fn route_applied(&self, route: &Route) -> Option<ViewCommand> {
        let bounds = route.bounds()?;
        Some(self.emit(ViewCommand::FitBounds(bounds)))
    }

    /// A position arrived; only the very first fix moves the camera
    pub fn position_fix(&mut self, position: &Position) -> Option<ViewCommand> {
        if self.centered_on_first_fix {
            return None;
        }
        self.centered_on_first_fix = true;
        Some(self.fly_to(position, self.camera.fly_duration_ms))
    }

    /// A new destination was chosen
    pub fn destination_selected(&self, destination: &Destination) -> ViewCommand {
        self.emit(ViewCommand::FlyTo {
            center: destination.coords,
            zoom: self.camera.zoom,
            duration_ms: self.camera.fly_duration_ms,
        })
    }

    /// The recenter control was activated
    pub fn recenter(&self, position: &Position) -> ViewCommand {
        self.fly_to(position, self.camera.recenter_duration_ms)
    }

    fn fly_to(&self, position: &Position, duration_ms: u64) -> ViewCommand {
        self.emit(ViewCommand::FlyTo {
            center: position.coords,
            zoom: self.camera.zoom,
            duration_ms,
        })
    }

    fn emit(&self, command: ViewCommand) -> ViewCommand {
        tracing::debug!("View command: {:?}", command);
        self.for_each_subscriber(|subscriber| subscriber.on_view_command(&command));
        command
    }

    /// Deliver the current renderable state to all subscribers
    pub fn publish_snapshot(&self, snapshot: &MapSnapshot) {
        self.for_each_subscriber(|subscriber| subscriber.on_snapshot(snapshot));
    }

    fn for_each_subscriber(&self, mut f: impl FnMut(&dyn ViewSubscriber)) {
        let mut subscribers = self.subscribers.write();

        // Remove any dead weak references
        subscribers.retain(|weak| weak.strong_count() > 0);

        for weak in subscribers.iter() {
            if let Some(subscriber) = weak.upgrade() {
                f(subscriber.as_ref());
            }
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().iter().filter(|weak| weak.strong_count() > 0).count()
    }
}
