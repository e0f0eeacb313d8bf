use std::sync::Arc;
use parking_lot::Mutex;
use ahash::AHashMap;

/// Typed bus for notices the core publishes
///
/// Non-fatal failures and lifecycle changes go out here so shells can show
/// a toast or a status line without polling the snapshot.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all notices implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Notices published by the navigator
pub mod events {
    use super::Event;
    use crate::error::{LookupError, PositionError};
    use crate::position::Position;
    use crate::ride::RideState;
    use crate::route::RouteSummary;

    /// The position source failed; the last known fix is still in use
    #[derive(Debug, Clone)]
    pub struct PositionUnavailable {
        pub error: PositionError,
        pub last_known: Option<Position>,
    }

    /// A suggestion lookup failed and the list was cleared
    #[derive(Debug, Clone)]
    pub struct SearchFailed {
        pub query: String,
        pub error: LookupError,
    }

    /// A route lookup failed; the previous route is still displayed
    #[derive(Debug, Clone)]
    pub struct RouteFailed {
        pub error: LookupError,
        pub keeping_previous: bool,
    }

    /// A new route is on display
    #[derive(Debug, Clone)]
    pub struct RouteUpdated {
        pub summary: RouteSummary,
    }

    /// The ride moved between lifecycle states
    #[derive(Debug, Clone)]
    pub struct RideStateChanged {
        pub from: RideState,
        pub to: RideState,
    }

    // Implement Event trait for all notice types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        PositionUnavailable,
        SearchFailed,
        RouteFailed,
        RouteUpdated,
        RideStateChanged
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

/// Create a handler that only sees one concrete notice type
pub fn typed_handler<E, F>(mut f: F) -> Box<dyn EventHandler>
where
    E: Event,
    F: FnMut(&E) + Send + Sync + 'static,
{
    handler_from_fn(move |event| {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            f(event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::events::{RideStateChanged, RouteFailed};
    use crate::error::LookupError;
    use crate::ride::RideState;

    #[test]
    fn test_publish_reaches_typed_subscribers_only() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<RideStateChanged>(typed_handler(move |e: &RideStateChanged| {
            sink.lock().push(e.to);
        }));

        bus.publish(RideStateChanged { from: RideState::Idle, to: RideState::Previewing });
        bus.publish(RouteFailed { error: LookupError::NoRoute, keeping_previous: false });

        assert_eq!(*seen.lock(), vec![RideState::Previewing]);
    }
}
