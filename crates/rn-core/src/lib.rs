//! Core navigation state for the ride navigator
//!
//! This crate holds everything that decides *what* the map shows: the ride
//! session, the debounced suggestion search, race-safe route refreshes and
//! the floating recenter control. It performs no I/O. External capabilities
//! are described by the traits in [`services`] and implemented elsewhere.

pub mod config;
pub mod control;
pub mod coords;
pub mod error;
pub mod events;
pub mod navigator;
pub mod position;
pub mod ride;
pub mod route;
pub mod search;
pub mod sequence;
pub mod services;
pub mod state;
pub mod view;

// Re-export commonly used types
pub use config::{CameraConfig, ControlConfig, NavigatorConfig, SearchConfig};
pub use control::{ControlAffordance, ControlVisibility, DragHandle, ScreenOffset};
pub use coords::{Bounds, LatLng};
pub use error::{ConfigError, LookupError, PositionError, SessionError};
pub use events::{EventBus, handler_from_fn, typed_handler};
pub use navigator::{Effect, NavEvent, Navigator};
pub use position::{Position, PositionOptions};
pub use ride::{ClickedLocation, Destination, RideSession, RideState};
pub use route::{Route, RouteEngine, RouteLookup, RouteOutcome, RouteRequest, RouteSummary};
pub use search::{SearchRequest, Suggestion, SuggestionSearch};
pub use sequence::{Seq, SequenceCounter};
pub use services::{Geocoder, PositionReading, PositionSource, RouteProvider, WatchHandle};
pub use state::{MapSnapshot, MapStyle};
pub use view::{ViewCommand, ViewCommandEmitter, ViewSubscriber};
